use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;

/// In-flight HTTP requests, each cancellable through its own token.
#[derive(Default)]
pub struct RequestPool {
    active: Mutex<HashMap<String, CancellationToken>>,
}

impl RequestPool {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CancellationToken>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a new request under a fresh id.
    ///
    /// The entry is removed when the returned guard drops, whichever way the
    /// request finishes.
    pub fn register(&self) -> RequestGuard<'_> {
        let id = uuid::Uuid::new_v4().to_string();
        let token = CancellationToken::new();
        self.lock().insert(id.clone(), token.clone());

        RequestGuard {
            id,
            token,
            pool: self,
        }
    }

    /// Cancels every in-flight request and empties the pool.
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<CancellationToken> = self.lock().drain().map(|(_, token)| token).collect();
        for token in &drained {
            token.cancel();
        }
        drained.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Pool membership of one request.
pub struct RequestGuard<'a> {
    id: String,
    token: CancellationToken,
    pool: &'a RequestPool,
}

impl RequestGuard<'_> {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for RequestGuard<'_> {
    fn drop(&mut self) {
        self.pool.lock().remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_removes_entry_on_drop() {
        let pool = RequestPool::new();
        {
            let _a = pool.register();
            let _b = pool.register();
            assert_eq!(pool.len(), 2);
        }
        assert!(pool.is_empty());
    }

    #[test]
    fn test_cancel_all_cancels_every_token() {
        let pool = RequestPool::new();
        let a = pool.register();
        let b = pool.register();

        assert_eq!(pool.cancel_all(), 2);
        assert!(a.token().is_cancelled());
        assert!(b.token().is_cancelled());
        assert!(pool.is_empty());
    }

    #[test]
    fn test_cancelling_one_leaves_others() {
        let pool = RequestPool::new();
        let a = pool.register();
        let b = pool.register();
        assert_ne!(a.id(), b.id());

        a.token().cancel();
        assert!(!b.token().is_cancelled());
    }
}
