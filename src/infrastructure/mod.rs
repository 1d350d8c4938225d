// Infrastructure module - Background tasks, timers and HTTP plumbing
pub mod backoff;
pub mod http;
pub mod request_pool;
pub mod task_manager;
pub mod timer;

pub use backoff::{BackoffStrategy, RetryPolicy};
pub use http::{RequestOptions, join_url};
pub use request_pool::{RequestGuard, RequestPool};
pub use task_manager::TaskManager;
pub use timer::{ReconnectPolicy, ReconnectTimer};
