//! HTTP surface.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → request.rs (assign / propagate x-request-id)
//!     → trace span, request timeout
//!     → recovery.rs (panic → 500 failure outcome)
//!     → server.rs handlers (/aggregate, /statistics, /health)
//! ```

pub mod recovery;
pub mod request;
pub mod server;

pub use request::{request_id, X_REQUEST_ID};
pub use server::{AppState, HttpServer, ServerError};
