use crate::domains::places::{Place, PlaceLookup};
use async_trait::async_trait;

/// Fixed gazetteer searched by case-insensitive substring match.
#[derive(Debug, Clone, Default)]
pub struct StaticPlaceDirectory {
    places: Vec<Place>,
}

impl StaticPlaceDirectory {
    pub fn new(places: Vec<Place>) -> Self {
        Self { places }
    }
}

#[async_trait]
impl PlaceLookup for StaticPlaceDirectory {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Place>, String> {
        let needle = query.to_lowercase();
        Ok(self
            .places
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .take(limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> StaticPlaceDirectory {
        StaticPlaceDirectory::new(vec![
            Place {
                id: "hamburg".into(),
                name: "Hamburg Harbour".into(),
                coordinates: vec![53.54, 9.98],
            },
            Place {
                id: "bremen".into(),
                name: "Bremen".into(),
                coordinates: vec![53.08, 8.80],
            },
            Place {
                id: "bremerhaven".into(),
                name: "Bremerhaven".into(),
                coordinates: vec![53.54, 8.58],
            },
        ])
    }

    #[tokio::test]
    async fn matches_ignore_case_and_keep_order() {
        let hits = directory().search("BREM", 10).await.unwrap();
        let ids: Vec<&str> = hits.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["bremen", "bremerhaven"]);
    }

    #[tokio::test]
    async fn limit_caps_results() {
        let hits = directory().search("r", 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "hamburg");
    }
}
