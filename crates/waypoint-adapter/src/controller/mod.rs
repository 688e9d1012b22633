//! Inbound Adapters - Entry points for the presentation layer

pub mod record_controller;
