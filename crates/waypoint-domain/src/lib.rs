//! # Waypoint Domain Layer
//!
//! Pure retrieval logic with zero external dependencies.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Domain Layer (This Crate)                     │
//! │  ┌─────────────────────────────────────────────────────────────┐│
//! │  │  model/     - Record, Criteria, RetryPolicy, CallContext    ││
//! │  │  repository/- Port traits (UpstreamFetcher, RecordRepo)     ││
//! │  │  service/   - Domain services (RetryLoop, Backoff)          ││
//! │  │  event      - CallLog side channel                          ││
//! │  └─────────────────────────────────────────────────────────────┘│
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Data flows Controller → Service → Repository → UpstreamFetcher.
//! Every layer may inspect, log and re-wrap errors on the way back up,
//! but no layer keeps state between calls.

pub mod error;
pub mod event;
pub mod model;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::{cause_chain, render_chain, ErrorClass};
pub use event::{CallEvent, CallLog, CallOutcome, Layer, NullCallLog};
pub use model::{
    context::{CallContext, CancelToken, Interrupt},
    criteria::Criteria,
    policy::RetryPolicy,
    record::{Record, RecordId},
};

pub use repository::{
    record_repository::{RecordRepository, RepositoryError},
    upstream::{UpstreamError, UpstreamFetcher},
};

pub use service::backoff::{Backoff, BlockingBackoff};
pub use service::retry_loop::{RetryEvent, RetryLoop, RetryState};
