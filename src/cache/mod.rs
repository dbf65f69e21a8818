//! Cache-aside fetching with single-flight population.
//!
//! # Data Flow
//! ```text
//! get_or_fetch(key, ttl, fetch)
//!     → store.rs fresh entry?        yes → Success(value)      (no lock)
//!     → locks.rs key lock (bounded)  timeout → Failure(LockTimeout)
//!     → store.rs fresh entry?        yes → Success(value)
//!     → fetch() once
//!         Success → store {value, now + ttl}
//!         Failure → store nothing
//! ```
//!
//! # Design Decisions
//! - One explicit context (store + lock registry) shared via `Arc`, no statics
//! - Locks are per key, never global
//! - Failures are never memoized; the next caller fetches again
//! - Expired entries are evicted lazily on read

pub mod fetcher;
pub mod locks;
pub mod store;

pub use fetcher::CacheAside;
pub use locks::LockRegistry;
pub use store::{CacheEntry, CacheStore};
