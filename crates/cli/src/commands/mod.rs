//! CLI Commands

pub mod burst;
pub mod demo;
pub mod search;
pub mod view;

pub use burst::BurstCommand;
pub use demo::DemoCommand;
pub use search::SearchCommand;
pub use view::ViewCommand;
