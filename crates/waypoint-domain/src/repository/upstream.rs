//! Upstream Fetcher - Abstract access to the unreliable record source
//!
//! An upstream is a pure, possibly failing, possibly slow provider.
//! Retry, caching and backoff are never its concern.

use crate::error::ErrorClass;
use crate::model::criteria::Criteria;
use crate::model::record::{Record, RecordId};

/// Errors raised by an upstream source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    /// Timeout or connection loss
    Transient { message: String },
    /// Unknown id or anything else a retry cannot fix
    Permanent { message: String },
}

impl UpstreamError {
    pub fn transient(message: impl Into<String>) -> Self {
        UpstreamError::Transient {
            message: message.into(),
        }
    }

    pub fn permanent(message: impl Into<String>) -> Self {
        UpstreamError::Permanent {
            message: message.into(),
        }
    }

    /// Standard permanent error for an unknown id
    pub fn not_found(id: &RecordId) -> Self {
        Self::permanent(format!("record not found: {}", id))
    }

    pub fn classification(&self) -> ErrorClass {
        match self {
            UpstreamError::Transient { .. } => ErrorClass::Transient,
            UpstreamError::Permanent { .. } => ErrorClass::Permanent,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            UpstreamError::Transient { message } | UpstreamError::Permanent { message } => message,
        }
    }
}

impl core::fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for UpstreamError {}

/// Upstream Fetcher Trait
///
/// This is a PORT in hexagonal architecture.
/// Implementations must be reentrant: one instance may serve concurrent
/// callers without external locking.
pub trait UpstreamFetcher: Send + Sync {
    /// Fetch one record by ID
    ///
    /// Fails `Transient` for timeout-like conditions and `Permanent`
    /// when the id is unknown.
    fn fetch_one(&self, id: &RecordId) -> Result<Record, UpstreamError>;

    /// Fetch every record matching the criteria
    ///
    /// Absence is an empty vector, never an error.
    fn fetch_many(&self, criteria: &Criteria) -> Result<Vec<Record>, UpstreamError>;
}

impl<T: UpstreamFetcher + ?Sized> UpstreamFetcher for std::sync::Arc<T> {
    fn fetch_one(&self, id: &RecordId) -> Result<Record, UpstreamError> {
        (**self).fetch_one(id)
    }

    fn fetch_many(&self, criteria: &Criteria) -> Result<Vec<Record>, UpstreamError> {
        (**self).fetch_many(criteria)
    }
}
