//! Domain Models - The vocabulary of Waypoint
//!
//! Everything here is created per call and dropped when the call returns.

pub mod context;
pub mod criteria;
pub mod policy;
pub mod record;
