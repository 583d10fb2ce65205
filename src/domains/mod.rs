pub mod fleet;
pub mod logger;
pub mod places;

pub use fleet::*;
pub use logger::*;
pub use places::*;
