//! Core error types.

use thiserror::Error;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the recurrence engine.
///
/// Malformed rule input never lands here: rule parsing degrades to
/// defaults instead. These variants cover inputs that cannot be given a
/// meaning at all, and programmer errors that must fail fast.
#[derive(Debug, Error)]
pub enum Error {
    /// A date-key string is not in `YYYY-MM-DDTHH:MM:SS` form.
    #[error("invalid date key: {value:?}")]
    InvalidDateKey { value: String },

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An overlay patch path walks through a scalar value.
    #[error("overlay path {path:?} traverses a non-structured value")]
    PathThroughScalar { path: String },

    /// The referenced event is not known.
    #[error("unknown event: {id}")]
    UnknownEvent { id: String },

    /// A time zone name could not be resolved.
    #[error("invalid time zone: {name}")]
    InvalidTimeZone { name: String },
}

impl Error {
    /// Creates an invalid date key error.
    pub fn invalid_date_key(value: impl Into<String>) -> Self {
        Self::InvalidDateKey {
            value: value.into(),
        }
    }

    /// Creates a path-through-scalar error.
    pub fn path_through_scalar(path: impl Into<String>) -> Self {
        Self::PathThroughScalar { path: path.into() }
    }

    /// Creates an unknown event error.
    pub fn unknown_event(id: impl Into<String>) -> Self {
        Self::UnknownEvent { id: id.into() }
    }

    /// Creates an invalid time zone error.
    pub fn invalid_time_zone(name: impl Into<String>) -> Self {
        Self::InvalidTimeZone { name: name.into() }
    }
}
