// WebSocket module - Event socket lifecycle and reconnection
mod factory;
mod manager;
mod state;

pub use factory::{WebSocketFactory, WsStream};
pub use manager::WebSocketManager;
pub use state::SocketState;
