//! # Waypoint Audit
//!
//! Call-log sink for the retrieval pipeline.

mod audit_logger;

pub use audit_logger::{AuditEntry, AuditLayer, AuditLogger, AuditOutcome, AuditStats};
