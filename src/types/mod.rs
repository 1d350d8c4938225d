pub mod constants;
pub mod error;
pub mod status;

pub use constants::*;
pub use error::{KiroError, KiroErrorType, Result};
pub use status::{ConnectionError, ConnectionStatus, HealthStatus, ServiceAvailability, ServiceInfo};
