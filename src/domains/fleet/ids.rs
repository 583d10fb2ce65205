use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Source of identifiers for paths and drones.
///
/// Paths and drones have independent id spaces. Each call receives the ids
/// already present in the target collection. The aggregate still rejects a
/// taken id and asks again, a bounded number of times.
pub trait IdAllocator: Send + Sync {
    fn next_path_id(&self, existing: &[&str]) -> String;
    fn next_drone_id(&self, existing: &[&str]) -> String;
}

/// Random v4 UUIDs. The default for long-lived stores.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidAllocator;

impl IdAllocator for UuidAllocator {
    fn next_path_id(&self, _existing: &[&str]) -> String {
        Uuid::new_v4().to_string()
    }

    fn next_drone_id(&self, _existing: &[&str]) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Monotonic `path-N` / `drone-N` ids, handy for demos and tests.
///
/// The next number is one past the highest of the allocator's own counter and
/// any `prefix-N` id already stored, so a fresh allocator over a persisted
/// fleet continues where the previous process stopped.
#[derive(Debug, Default)]
pub struct SequentialAllocator {
    paths: AtomicU64,
    drones: AtomicU64,
}

impl SequentialAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(counter: &AtomicU64, prefix: &str, existing: &[&str]) -> String {
        let highest = existing
            .iter()
            .filter_map(|id| id.strip_prefix(prefix)?.strip_prefix('-')?.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        let previous = counter
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| Some(n.max(highest) + 1))
            .unwrap_or_else(|n| n);
        format!("{}-{}", prefix, previous.max(highest) + 1)
    }
}

impl IdAllocator for SequentialAllocator {
    fn next_path_id(&self, existing: &[&str]) -> String {
        Self::next(&self.paths, "path", existing)
    }

    fn next_drone_id(&self, existing: &[&str]) -> String {
        Self::next(&self.drones, "drone", existing)
    }
}
