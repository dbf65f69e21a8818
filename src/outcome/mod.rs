//! Success/failure result shared by every component.
//!
//! # Data Flow
//! ```text
//! transport / cache / source client
//!     → Outcome::success(value) | Outcome::failure(error)
//!     → aggregator merges outcomes
//!     → http layer maps to status + JSON
//! ```
//!
//! # Design Decisions
//! - Expected failures travel as values, never as panics
//! - The enum makes "exactly one of value/error" structural
//! - Construction is explicit; there is no `From<Error>` for `Outcome`

pub mod error;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

pub use error::{global, Error, ErrorCatalog, ErrorKind};

static NO_ERROR: Error = Error::NONE;

/// Result of a fetch or aggregation.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum Outcome<T> {
    Success(T),
    Failure(Error),
}

impl<T> Outcome<T> {
    pub fn success(value: T) -> Self {
        Outcome::Success(value)
    }

    pub fn failure(error: Error) -> Self {
        Outcome::Failure(error)
    }

    pub fn succeeded(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn failed(&self) -> bool {
        !self.succeeded()
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Failure(_) => None,
        }
    }

    /// The failure error, or [`Error::NONE`] for a success.
    pub fn error(&self) -> &Error {
        match self {
            Outcome::Success(_) => &NO_ERROR,
            Outcome::Failure(error) => error,
        }
    }

    pub fn map<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::Failure(error) => Outcome::Failure(error),
        }
    }

    /// Drop the error and keep the value if any.
    pub fn ok(self) -> Option<T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Failure(_) => None,
        }
    }

    pub fn into_result(self) -> Result<T, Error> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(error) => Err(error),
        }
    }
}

impl<T: Serialize> Serialize for Outcome<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Outcome", 3)?;
        state.serialize_field("succeeded", &self.succeeded())?;
        state.serialize_field("value", &self.value())?;
        match self {
            Outcome::Success(_) => state.serialize_field("error", &Option::<&Error>::None)?,
            Outcome::Failure(error) => state.serialize_field("error", &Some(error))?,
        }
        state.end()
    }
}
