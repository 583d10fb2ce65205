use crate::common::{AggregateRoot, ApplicationResult, DomainError};
use crate::domains::fleet::{AggregateRepository, FleetAggregate};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory aggregate repository for testing and development
#[derive(Debug, Default)]
pub struct InMemoryAggregateRepository {
    records: RwLock<HashMap<String, FleetAggregate>>,
}

impl InMemoryAggregateRepository {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl AggregateRepository for InMemoryAggregateRepository {
    async fn load(&self, key: &str) -> ApplicationResult<Option<FleetAggregate>> {
        let records = self.records.read().await;
        Ok(records.get(key).cloned())
    }

    async fn save(
        &self,
        key: &str,
        expected_version: u64,
        aggregate: &FleetAggregate,
    ) -> ApplicationResult<u64> {
        let mut records = self.records.write().await;

        let current_version = records.get(key).map(|a| a.version).unwrap_or(0);
        if current_version != expected_version {
            return Err(DomainError::ConcurrencyConflict {
                expected: expected_version,
                actual: current_version,
            }
            .into());
        }

        let mut stored = aggregate.clone();
        stored.take_uncommitted_events();
        stored.version = expected_version + 1;
        records.insert(key.to_string(), stored);

        Ok(expected_version + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ApplicationError;

    #[tokio::test]
    async fn stale_writes_are_rejected() {
        let repo = InMemoryAggregateRepository::new();
        let fleet = FleetAggregate::new("default".into(), "Default Drone".into());

        assert_eq!(repo.save("default", 0, &fleet).await.unwrap(), 1);
        assert_eq!(repo.save("default", 1, &fleet).await.unwrap(), 2);

        let err = repo.save("default", 1, &fleet).await.unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Domain(DomainError::ConcurrencyConflict { expected: 1, actual: 2 })
        ));

        let stored = repo.load("default").await.unwrap().unwrap();
        assert_eq!(stored.version, 2);
        assert!(stored.uncommitted_events().is_empty());
    }

    #[tokio::test]
    async fn unknown_key_loads_nothing() {
        let repo = InMemoryAggregateRepository::new();
        assert!(repo.load("missing").await.unwrap().is_none());
    }
}
