pub mod aggregate;
pub mod color;
pub mod events;
pub mod ids;
pub mod ports;
pub mod projections;
pub mod requests;

pub use aggregate::*;
pub use color::*;
pub use events::*;
pub use ids::*;
pub use ports::*;
pub use projections::*;
pub use requests::*;
