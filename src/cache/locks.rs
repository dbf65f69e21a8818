//! Per-key async locks.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

/// Registry handing out one mutex per cache key.
///
/// Locks are created on first use and live for the process.
#[derive(Debug, Default)]
pub struct LockRegistry {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock_for(&self, key: &str) -> Arc<Mutex<()>> {
        if let Some(lock) = self.locks.get(key) {
            return lock.clone();
        }
        self.locks.entry(key.to_string()).or_default().clone()
    }
}
