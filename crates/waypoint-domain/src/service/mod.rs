//! Domain Services - Retrieval logic that doesn't belong to a single entity

pub mod backoff;
pub mod retry_loop;
