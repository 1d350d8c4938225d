use std::time::Duration;

/// Lifecycle of the event socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SocketState {
    /// Never connected
    #[default]
    Idle,
    Connecting,
    Connected,
    /// Waiting `delay` before reconnect `attempt` (one-based)
    BackingOff { attempt: u32, delay: Duration },
    /// Disconnected on request, or the reconnect budget ran out
    Stopped,
}

impl SocketState {
    /// Whether a supervisor is currently driving the socket.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Self::Connecting | Self::Connected | Self::BackingOff { .. }
        )
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl std::fmt::Display for SocketState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Connecting => f.write_str("connecting"),
            Self::Connected => f.write_str("connected"),
            Self::BackingOff { attempt, delay } => {
                write!(f, "backing off (attempt {}, {}ms)", attempt, delay.as_millis())
            }
            Self::Stopped => f.write_str("stopped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_states() {
        assert!(!SocketState::Idle.is_active());
        assert!(SocketState::Connecting.is_active());
        assert!(SocketState::Connected.is_active());
        assert!(
            SocketState::BackingOff {
                attempt: 1,
                delay: Duration::from_secs(1)
            }
            .is_active()
        );
        assert!(!SocketState::Stopped.is_active());
    }
}
