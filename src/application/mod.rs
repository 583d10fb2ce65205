pub mod fleet_service;
pub mod place_service;
pub mod wiring;

pub use fleet_service::*;
pub use place_service::*;
pub use wiring::*;
