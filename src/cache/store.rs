//! TTL-bounded, type-erased value store.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

type Erased = Arc<dyn Any + Send + Sync>;

/// A cached value and its expiry.
///
/// Entries are replaced wholesale on repopulation.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    pub expires_at: Instant,
}

impl<T> CacheEntry<T> {
    pub fn new(value: T, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    pub fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Process-lifetime cache keyed by string.
///
/// Values of different types can live side by side; a lookup with the wrong
/// type behaves as a miss.
#[derive(Default)]
pub struct CacheStore {
    entries: DashMap<String, CacheEntry<Erased>>,
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("len", &self.entries.len())
            .finish()
    }
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh value for `key`, if any.
    pub fn get<T>(&self, key: &str) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let now = Instant::now();

        let found = self.entries.get(key).map(|entry| {
            if entry.is_fresh(now) {
                Some(entry.value.clone())
            } else {
                None
            }
        });

        match found {
            Some(Some(erased)) => erased.downcast_ref::<T>().cloned(),
            Some(None) => {
                self.entries.remove_if(key, |_, entry| !entry.is_fresh(now));
                None
            }
            None => None,
        }
    }

    pub fn insert<T>(&self, key: &str, value: T, ttl: Duration)
    where
        T: Send + Sync + 'static,
    {
        let erased: Erased = Arc::new(value);
        self.entries
            .insert(key.to_string(), CacheEntry::new(erased, ttl));
    }

    pub fn remove(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
