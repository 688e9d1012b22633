//! Error types for Waypoint

use thiserror::Error;

/// General Waypoint error type
#[derive(Debug, Error)]
pub enum WaypointError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid value '{value}' for {var}")]
    InvalidOverride { var: String, value: String },
}

pub type Result<T> = std::result::Result<T, WaypointError>;
