//! Resilience for outbound calls.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → transport::client (per-attempt timeout)
//!     → On failure: retries.rs (check if retryable, retry with backoff.rs delay)
//! ```
//!
//! # Design Decisions
//! - Every outbound attempt has a deadline (reqwest client timeout)
//! - Retries only for idempotent requests (GET, HEAD, etc.)
//! - Jittered backoff avoids synchronized retry waves

pub mod backoff;
pub mod retries;
