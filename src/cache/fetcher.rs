//! Double-checked, single-flight cache population.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use crate::cache::locks::LockRegistry;
use crate::cache::store::CacheStore;
use crate::observability::metrics;
use crate::outcome::{global, Outcome};

/// Default bounded wait for a key's population lock.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Cache store plus lock registry.
///
/// Construct once and share through `Arc` with every client that caches.
#[derive(Debug)]
pub struct CacheAside {
    store: CacheStore,
    locks: LockRegistry,
    lock_timeout: Duration,
}

impl Default for CacheAside {
    fn default() -> Self {
        Self::new(DEFAULT_LOCK_TIMEOUT)
    }
}

impl CacheAside {
    pub fn new(lock_timeout: Duration) -> Self {
        Self {
            store: CacheStore::new(),
            locks: LockRegistry::new(),
            lock_timeout,
        }
    }

    pub fn shared(lock_timeout: Duration) -> Arc<Self> {
        Arc::new(Self::new(lock_timeout))
    }

    /// Return the fresh cached value for `key`, or populate it with `fetch`.
    ///
    /// Concurrent callers on a cold key share a single `fetch` invocation.
    /// Failed fetches are returned as-is and never cached.
    pub async fn get_or_fetch<T, F, Fut>(&self, key: &str, ttl: Duration, fetch: F) -> Outcome<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Outcome<T>>,
    {
        if let Some(value) = self.store.get::<T>(key) {
            tracing::debug!(key, "Cache hit");
            metrics::record_cache_lookup(key, true);
            return Outcome::success(value);
        }

        let lock = self.locks.lock_for(key);
        // Guard releases on every exit path, including unwinding.
        let _guard = match tokio::time::timeout(self.lock_timeout, lock.lock_owned()).await {
            Ok(guard) => guard,
            Err(_) => {
                tracing::warn!(
                    key,
                    timeout_ms = self.lock_timeout.as_millis() as u64,
                    "Timed out waiting for cache population lock"
                );
                return Outcome::failure(global::LOCK_TIMEOUT.with_details(json!({
                    "key": key,
                    "timeoutMs": self.lock_timeout.as_millis() as u64,
                })));
            }
        };

        // Another caller may have populated the key while we waited.
        if let Some(value) = self.store.get::<T>(key) {
            tracing::debug!(key, "Cache hit after lock wait");
            metrics::record_cache_lookup(key, true);
            return Outcome::success(value);
        }

        metrics::record_cache_lookup(key, false);
        tracing::debug!(key, "Cache miss, fetching");

        let outcome = fetch().await;
        match &outcome {
            Outcome::Success(value) => {
                self.store.insert(key, value.clone(), ttl);
                tracing::debug!(key, ttl_secs = ttl.as_secs(), "Cache populated");
            }
            Outcome::Failure(error) => {
                tracing::debug!(key, code = %error.code, "Fetch failed, nothing cached");
            }
        }
        outcome
    }

    /// Drop the entry for `key` so the next call fetches.
    pub fn invalidate(&self, key: &str) -> bool {
        self.store.remove(key)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn lock_timeout(&self) -> Duration {
        self.lock_timeout
    }
}
