//! # Waypoint Adapter Layer
//!
//! External system integrations (Hexagonal Architecture adapters).
//!
//! ## Structure
//!
//! - `controller/` - Inbound adapter (the public entry point)
//! - `gateway/` - Outbound adapters (upstream sources, catalog files)
//! - `repository/` - `RecordRepository` implementations

pub mod controller;
pub mod gateway;
pub mod repository;

pub use controller::record_controller::RecordController;
pub use gateway::catalog::{load_catalog, parse_catalog, CatalogError, RecordDto};
pub use gateway::scripted::ScriptedUpstream;
pub use gateway::simulated::{SimulatedUpstream, TIMEOUT_SENTINEL};
pub use repository::retrying::RetryingRecordRepository;
