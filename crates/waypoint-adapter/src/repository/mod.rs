//! Persistence Adapters - Repository implementations
//!
//! These implement `RecordRepository` from waypoint-domain.

pub mod retrying;
