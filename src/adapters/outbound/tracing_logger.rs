use crate::domains::logger::{DomainLogger, DynLogger};
use std::sync::Arc;

/// Forwards domain log lines to `tracing` under the `drone_fleet::domain` target.
struct TracingBridge;

impl DomainLogger for TracingBridge {
    fn info(&self, msg: &str) {
        tracing::info!(target: "drone_fleet::domain", "{}", msg);
    }

    fn warn(&self, msg: &str) {
        tracing::warn!(target: "drone_fleet::domain", "{}", msg);
    }

    fn error(&self, msg: &str) {
        tracing::error!(target: "drone_fleet::domain", "{}", msg);
    }
}

/// Domain logger backed by whatever `tracing` subscriber is installed.
pub fn init_tracing_logger() -> DynLogger {
    Arc::new(TracingBridge)
}
