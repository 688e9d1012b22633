//! # Waypoint Use Case Layer
//!
//! Application-specific business rules.
//! This layer sits between the controller and the repository and decides
//! what a failure means to the business:
//!
//! - collection queries degrade to an empty result
//! - single-item queries fail loudly with business context attached

pub use waypoint_domain;

pub mod record_service;

pub use record_service::{CatalogService, RecordService, ServiceError};
