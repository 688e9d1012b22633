//! Port Traits - The "Ports" of Hexagonal Architecture
//!
//! ```text
//! Domain Layer          │  Adapter Layer
//! ──────────────────────┼────────────────────────────
//! trait UpstreamFetcher │  SimulatedUpstream
//!   fn fetch_one()      │  ScriptedUpstream
//!   fn fetch_many()     │
//! trait RecordRepository│  RetryingRecordRepository
//!   fn find_all()       │
//!   fn find_by_id()     │
//! ```

pub mod record_repository;
pub mod upstream;
