// Messaging module - Event types and subscriber routing
pub mod event;
pub mod router;

pub use event::{EventType, KiroEvent};
pub use router::{EventCallback, EventRouter, Subscription};
