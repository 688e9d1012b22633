//! Record Repository - Data access with bounded retry
//!
//! The repository sits directly above the upstream. Collection queries
//! are best effort; single-item queries retry transient failures and
//! then fail with a terminal error.

use crate::error::ErrorClass;
use crate::model::context::{CallContext, Interrupt};
use crate::model::criteria::Criteria;
use crate::model::policy::RetryPolicy;
use crate::model::record::{Record, RecordId};
use crate::repository::upstream::UpstreamError;

/// Terminal errors from `find_by_id`
///
/// Every variant records how many upstream calls were made and keeps the
/// last upstream error as its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Every attempt failed transiently and the retry budget is spent
    Exhausted {
        id: RecordId,
        attempts: u32,
        cause: UpstreamError,
    },
    /// Upstream reported a permanent failure (not retried)
    Permanent {
        id: RecordId,
        attempts: u32,
        cause: UpstreamError,
    },
    /// The call context was cancelled or its deadline passed
    Interrupted {
        id: RecordId,
        attempts: u32,
        reason: Interrupt,
        last_cause: Option<UpstreamError>,
    },
}

impl RepositoryError {
    pub fn id(&self) -> &RecordId {
        match self {
            RepositoryError::Exhausted { id, .. }
            | RepositoryError::Permanent { id, .. }
            | RepositoryError::Interrupted { id, .. } => id,
        }
    }

    /// Upstream calls made before giving up
    pub fn attempts(&self) -> u32 {
        match self {
            RepositoryError::Exhausted { attempts, .. }
            | RepositoryError::Permanent { attempts, .. }
            | RepositoryError::Interrupted { attempts, .. } => *attempts,
        }
    }

    /// The last upstream error observed, if any call was made
    pub fn upstream_cause(&self) -> Option<&UpstreamError> {
        match self {
            RepositoryError::Exhausted { cause, .. } | RepositoryError::Permanent { cause, .. } => {
                Some(cause)
            }
            RepositoryError::Interrupted { last_cause, .. } => last_cause.as_ref(),
        }
    }

    /// Interruptions count as transient: the same call may succeed later.
    pub fn classification(&self) -> ErrorClass {
        match self {
            RepositoryError::Permanent { .. } => ErrorClass::Permanent,
            RepositoryError::Exhausted { .. } | RepositoryError::Interrupted { .. } => {
                ErrorClass::Transient
            }
        }
    }
}

impl core::fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RepositoryError::Exhausted { id, attempts, .. } => {
                write!(f, "gave up on record {} after {} attempts", id, attempts)
            }
            RepositoryError::Permanent { id, attempts, .. } => {
                write!(
                    f,
                    "record {} is unavailable (permanent failure on attempt {})",
                    id, attempts
                )
            }
            RepositoryError::Interrupted {
                id,
                attempts,
                reason,
                ..
            } => {
                write!(
                    f,
                    "lookup of record {} stopped after {} attempts: {}",
                    id, attempts, reason
                )
            }
        }
    }
}

impl std::error::Error for RepositoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.upstream_cause()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

/// Record Repository Trait
///
/// This is a PORT in hexagonal architecture.
/// Implementations hold no per-call state and may be shared across
/// threads.
pub trait RecordRepository: Send + Sync {
    /// Query the upstream once; any failure becomes an empty vector
    fn find_all(&self, criteria: &Criteria) -> Vec<Record>;

    /// Fetch one record, retrying transient failures as `policy` allows
    fn find_by_id(
        &self,
        id: &RecordId,
        policy: &RetryPolicy,
        ctx: &CallContext,
    ) -> Result<Record, RepositoryError>;
}

impl<T: RecordRepository + ?Sized> RecordRepository for std::sync::Arc<T> {
    fn find_all(&self, criteria: &Criteria) -> Vec<Record> {
        (**self).find_all(criteria)
    }

    fn find_by_id(
        &self,
        id: &RecordId,
        policy: &RetryPolicy,
        ctx: &CallContext,
    ) -> Result<Record, RepositoryError> {
        (**self).find_by_id(id, policy, ctx)
    }
}
