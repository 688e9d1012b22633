//! Waypoint CLI library: wiring and subcommands used by the `waypoint` binary

pub mod commands;
pub mod wiring;
