// Connection module - HTTP health, status and request pipeline
mod manager;

pub use manager::ConnectionManager;
