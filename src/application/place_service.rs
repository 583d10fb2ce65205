use crate::common::{ApplicationError, ApplicationResult, DomainError};
use crate::domains::places::{Place, PlaceLookup};
use std::sync::Arc;
use std::time::Duration;

/// Free-text place search in front of a [`PlaceLookup`] provider.
pub struct PlaceService {
    lookup: Arc<dyn PlaceLookup>,
    timeout: Duration,
    max_results: usize,
}

impl PlaceService {
    pub fn new(lookup: Arc<dyn PlaceLookup>, timeout: Duration, max_results: usize) -> Self {
        Self {
            lookup,
            timeout,
            max_results,
        }
    }

    /// Blank queries are invalid input; provider errors and timeouts are
    /// upstream failures. At most `max_results` hits come back, in provider order.
    pub async fn search(&self, query: &str) -> ApplicationResult<Vec<Place>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DomainError::invalid_input("place query must not be blank").into());
        }

        let lookup = self.lookup.search(query, self.max_results);
        let mut places = tokio::time::timeout(self.timeout, lookup)
            .await
            .map_err(|_| {
                ApplicationError::Upstream(format!(
                    "place lookup for {:?} timed out after {:?}",
                    query, self.timeout
                ))
            })?
            .map_err(ApplicationError::Upstream)?;

        places.truncate(self.max_results);
        tracing::debug!(query, hits = places.len(), "place lookup finished");
        Ok(places)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::StaticPlaceDirectory;
    use crate::common::ErrorKind;
    use async_trait::async_trait;

    struct FailingLookup;

    #[async_trait]
    impl PlaceLookup for FailingLookup {
        async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<Place>, String> {
            Err("503 Service Unavailable".to_string())
        }
    }

    struct SlowLookup;

    #[async_trait]
    impl PlaceLookup for SlowLookup {
        async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<Place>, String> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Vec::new())
        }
    }

    /// Ignores the limit it is given.
    struct ChattyLookup;

    #[async_trait]
    impl PlaceLookup for ChattyLookup {
        async fn search(&self, query: &str, _limit: usize) -> Result<Vec<Place>, String> {
            Ok((0..20)
                .map(|i| Place {
                    id: format!("{}-{}", query, i),
                    name: query.to_string(),
                    coordinates: vec![0.0, i as f64],
                })
                .collect())
        }
    }

    #[tokio::test]
    async fn blank_query_is_invalid_input() {
        let service = PlaceService::new(
            Arc::new(StaticPlaceDirectory::default()),
            Duration::from_secs(1),
            10,
        );
        let err = service.search("   ").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn provider_failure_is_upstream_error() {
        let service = PlaceService::new(Arc::new(FailingLookup), Duration::from_secs(1), 10);
        let err = service.search("Kiel").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamError);
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_provider_times_out() {
        let service = PlaceService::new(Arc::new(SlowLookup), Duration::from_millis(200), 10);
        let err = service.search("Kiel").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamError);
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn results_are_capped() {
        let service = PlaceService::new(Arc::new(ChattyLookup), Duration::from_secs(1), 5);
        let places = service.search(" Kiel ").await.unwrap();
        assert_eq!(places.len(), 5);
        assert_eq!(places[0].id, "Kiel-0");
    }
}
