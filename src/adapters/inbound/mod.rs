pub mod event_journal;
pub mod file_event_journal;
pub mod file_repository;
pub mod memory_repository;

pub use event_journal::*;
pub use file_event_journal::*;
pub use file_repository::*;
pub use memory_repository::*;
