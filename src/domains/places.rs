use crate::domains::fleet::Waypoint;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A search hit from a place lookup provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    pub name: String,
    pub coordinates: Waypoint,
}

/// Port for free-text place search. Adapters return their own error text;
/// the application layer turns it into an upstream failure.
#[async_trait]
pub trait PlaceLookup: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Place>, String>;
}
