// Module declarations
mod builder;
mod core;
mod registry;

// Public API exports
pub use builder::{KiroSdkBuilder, KiroSdkConfig, env_vars};
pub use self::core::KiroSdk;
pub use registry::ServiceRegistry;
