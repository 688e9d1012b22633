//! Outbound Adapters - Upstream record sources
//!
//! These implement `UpstreamFetcher` from waypoint-domain.

pub mod catalog;
pub mod scripted;
pub mod simulated;
