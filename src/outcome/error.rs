//! Structured error carried by failed outcomes.

use std::borrow::Cow;

use serde::Serialize;
use thiserror::Error as ThisError;

/// Failure categories shared by every component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ThisError)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No error. Only used by [`Error::NONE`].
    #[error("no error")]
    None,

    /// Upstream answered with a non-success status or could not be reached.
    #[error("upstream unavailable")]
    UpstreamUnavailable,

    /// Upstream answered with a success status but a blank body.
    #[error("empty upstream response")]
    EmptyUpstreamResponse,

    /// Upstream body could not be parsed into the expected shape.
    #[error("malformed upstream response")]
    MalformedUpstreamResponse,

    /// The cache population lock was not acquired in time.
    #[error("cache lock timeout")]
    LockTimeout,

    /// Every source of an aggregation failed.
    #[error("all sources unavailable")]
    AllSourcesUnavailable,

    /// Unexpected fault caught at the outer boundary.
    #[error("internal error")]
    Internal,
}

/// A coded error with a human readable description.
///
/// Codes are dotted and namespaced per source, e.g. `weather.failed_response`.
#[derive(Debug, Clone, PartialEq, Serialize, ThisError)]
#[serde(rename_all = "camelCase")]
#[error("{code}: {description}")]
pub struct Error {
    pub code: Cow<'static, str>,
    pub kind: ErrorKind,
    pub description: Cow<'static, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_details: Option<serde_json::Value>,
}

impl Error {
    /// Sentinel reported by successful outcomes.
    pub const NONE: Error = Error::new("", ErrorKind::None, "");

    /// Build an error from static parts. Usable in `const` catalogs.
    pub const fn new(code: &'static str, kind: ErrorKind, description: &'static str) -> Self {
        Self {
            code: Cow::Borrowed(code),
            kind,
            description: Cow::Borrowed(description),
            debug_details: None,
        }
    }

    /// Attach an operator-facing payload.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.debug_details = Some(details);
        self
    }

    /// True for the [`Error::NONE`] sentinel.
    pub fn is_none(&self) -> bool {
        self.kind == ErrorKind::None && self.code.is_empty()
    }
}

/// Per-source catalog of the three recoverable upstream failures.
#[derive(Debug, Clone)]
pub struct ErrorCatalog {
    pub failed_response: Error,
    pub empty_response: Error,
    pub malformed_response: Error,
}

/// Errors that do not belong to a single source.
pub mod global {
    use super::{Error, ErrorKind};

    pub const LOCK_TIMEOUT: Error = Error::new(
        "cache.lock_timeout",
        ErrorKind::LockTimeout,
        "Timed out waiting for the cache population lock",
    );

    pub const ALL_SOURCES_UNAVAILABLE: Error = Error::new(
        "aggregate.all_sources_unavailable",
        ErrorKind::AllSourcesUnavailable,
        "All upstream sources failed",
    );

    pub const SOURCE_TASK_FAILED: Error = Error::new(
        "aggregate.source_task_failed",
        ErrorKind::Internal,
        "A source fetch task terminated unexpectedly",
    );

    pub const UNEXPECTED: Error = Error::new(
        "global.unexpected_error",
        ErrorKind::Internal,
        "An error occurred",
    );
}
