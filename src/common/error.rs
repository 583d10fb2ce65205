use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Path not found: {id}")]
    PathNotFound { id: String },

    #[error("Drone not found: {id}")]
    DroneNotFound { id: String },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Concurrency conflict: expected version {expected}, got {actual}")]
    ConcurrencyConflict { expected: u64, actual: u64 },

    #[error("Could not allocate a unique {collection} id after {attempts} attempts")]
    IdExhausted {
        collection: &'static str,
        attempts: usize,
    },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl DomainError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        DomainError::InvalidInput {
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] anyhow::Error),
}

/// Caller-facing failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    UpstreamError,
    PersistenceError,
}

/// Structured failure handed back across the operation boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureReport {
    pub kind: ErrorKind,
    pub message: String,
}

impl ApplicationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApplicationError::Domain(DomainError::PathNotFound { .. })
            | ApplicationError::Domain(DomainError::DroneNotFound { .. }) => ErrorKind::NotFound,
            ApplicationError::Domain(DomainError::InvalidInput { .. }) => ErrorKind::InvalidInput,
            // A conflict only escapes the service once retries are exhausted.
            ApplicationError::Domain(DomainError::ConcurrencyConflict { .. })
            | ApplicationError::Domain(DomainError::IdExhausted { .. })
            | ApplicationError::Domain(DomainError::SerializationError(_))
            | ApplicationError::Persistence(_) => ErrorKind::PersistenceError,
            ApplicationError::Upstream(_) => ErrorKind::UpstreamError,
            ApplicationError::Configuration(_) => ErrorKind::InvalidInput,
        }
    }

    pub fn report(&self) -> FailureReport {
        FailureReport {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
pub type ApplicationResult<T> = Result<T, ApplicationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_variants_share_a_kind() {
        let path = ApplicationError::from(DomainError::PathNotFound { id: "p".into() });
        let drone = ApplicationError::from(DomainError::DroneNotFound { id: "d".into() });
        assert_eq!(path.kind(), ErrorKind::NotFound);
        assert_eq!(drone.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn report_carries_kind_and_message() {
        let err = ApplicationError::Upstream("geocoder timed out".into());
        let report = err.report();
        assert_eq!(report.kind, ErrorKind::UpstreamError);
        assert!(report.message.contains("geocoder timed out"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["kind"], "UpstreamError");
    }
}
