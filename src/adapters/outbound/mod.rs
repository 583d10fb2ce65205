pub mod http_places;
pub mod noop_logger;
pub mod place_directory;
pub mod tracing_logger;

pub use http_places::*;
pub use noop_logger::*;
pub use place_directory::*;
pub use tracing_logger::*;
