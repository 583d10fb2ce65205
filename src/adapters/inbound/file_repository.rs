use crate::common::{AggregateRoot, ApplicationError, ApplicationResult, DomainError};
use crate::domains::fleet::{AggregateRepository, FleetAggregate};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// File-backed aggregate repository.
///
/// Each aggregate is one pretty-printed JSON document at `<base>/<key>.json`.
/// Writes go to a temporary file that is renamed over the record, so readers
/// never observe a half-written document. The version check and the write
/// are serialized by an in-process lock; two processes sharing a directory
/// are not coordinated.
pub struct FileAggregateRepository {
    base_path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileAggregateRepository {
    pub fn new<P: Into<PathBuf>>(base_path: P) -> Self {
        Self {
            base_path: base_path.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn record_path(&self, key: &str) -> ApplicationResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(ApplicationError::Persistence(format!(
                "aggregate key {:?} is not usable as a file name",
                key
            )));
        }
        Ok(self.base_path.join(format!("{}.json", key)))
    }

    async fn read_record(path: &Path) -> ApplicationResult<Option<FleetAggregate>> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(ApplicationError::Persistence(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        serde_json::from_str(&content).map(Some).map_err(|e| {
            ApplicationError::Persistence(format!("Failed to parse {}: {}", path.display(), e))
        })
    }
}

#[async_trait]
impl AggregateRepository for FileAggregateRepository {
    async fn load(&self, key: &str) -> ApplicationResult<Option<FleetAggregate>> {
        let path = self.record_path(key)?;
        Self::read_record(&path).await
    }

    async fn save(
        &self,
        key: &str,
        expected_version: u64,
        aggregate: &FleetAggregate,
    ) -> ApplicationResult<u64> {
        let path = self.record_path(key)?;
        let _guard = self.write_lock.lock().await;

        let current_version = Self::read_record(&path)
            .await?
            .map(|a| a.version)
            .unwrap_or(0);
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
        let bytes = serde_json::to_vec_pretty(&stored).map_err(DomainError::from)?;

        tokio::fs::create_dir_all(&self.base_path).await.map_err(|e| {
            ApplicationError::Persistence(format!(
                "Failed to create store directory {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, &bytes).await.map_err(|e| {
            ApplicationError::Persistence(format!("Failed to write {}: {}", tmp_path.display(), e))
        })?;
        tokio::fs::rename(&tmp_path, &path).await.map_err(|e| {
            ApplicationError::Persistence(format!("Failed to replace {}: {}", path.display(), e))
        })?;

        tracing::debug!(
            key,
            version = stored.version,
            path = %path.display(),
            "fleet record written"
        );
        Ok(stored.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::fleet::SequentialAllocator;
    use tempfile::TempDir;

    #[tokio::test]
    async fn record_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let ids = SequentialAllocator::new();
        let mut fleet = FleetAggregate::new("default".into(), "Default Drone".into());
        fleet
            .create_path(&ids, None, vec![vec![1.0, 2.0], vec![3.0, 4.0]])
            .unwrap();

        {
            let repo = FileAggregateRepository::new(temp_dir.path().join("fleet"));
            assert_eq!(repo.save("default", 0, &fleet).await.unwrap(), 1);
        }

        let reopened = FileAggregateRepository::new(temp_dir.path().join("fleet"));
        let loaded = reopened.load("default").await.unwrap().unwrap();
        assert_eq!(loaded.version, 1);
        assert_eq!(loaded.paths, fleet.paths);
        assert_eq!(loaded.created_at, fleet.created_at);
    }

    #[tokio::test]
    async fn stale_version_conflicts() {
        let temp_dir = TempDir::new().unwrap();
        let repo = FileAggregateRepository::new(temp_dir.path());
        let fleet = FleetAggregate::new("default".into(), "Default Drone".into());

        repo.save("default", 0, &fleet).await.unwrap();
        let err = repo.save("default", 0, &fleet).await.unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Domain(DomainError::ConcurrencyConflict { expected: 0, actual: 1 })
        ));
    }

    #[tokio::test]
    async fn corrupt_record_is_a_persistence_error() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("default.json"), "{ not json").unwrap();

        let repo = FileAggregateRepository::new(temp_dir.path());
        assert!(matches!(
            repo.load("default").await,
            Err(ApplicationError::Persistence(_))
        ));
    }

    #[tokio::test]
    async fn rejects_path_like_keys() {
        let temp_dir = TempDir::new().unwrap();
        let repo = FileAggregateRepository::new(temp_dir.path());
        assert!(repo.load("../escape").await.is_err());
    }
}
