use super::aggregate::FleetAggregate;
use crate::common::ApplicationResult;
use async_trait::async_trait;

/// Port for loading and storing fleet aggregates by key.
///
/// Writes are optimistic: `save` succeeds only when the stored version still
/// equals `expected_version` (0 for a key that has never been written) and
/// fails with `DomainError::ConcurrencyConflict` otherwise. Any other failure
/// is reported as `ApplicationError::Persistence`.
#[async_trait]
pub trait AggregateRepository: Send + Sync {
    /// Returns the stored aggregate with its `version` field set.
    async fn load(&self, key: &str) -> ApplicationResult<Option<FleetAggregate>>;

    /// Stores `aggregate` under `key` and returns the new version.
    async fn save(
        &self,
        key: &str,
        expected_version: u64,
        aggregate: &FleetAggregate,
    ) -> ApplicationResult<u64>;
}
