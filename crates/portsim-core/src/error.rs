//! Errors returned by the port simulation

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PortError {
    #[error("invalid port configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no dock with index {index} (port has {count})")]
    UnknownDock { index: usize, count: usize },

    #[error("dock {index} is held by a ship")]
    DockInUse { index: usize },
}

pub type Result<T, E = PortError> = std::result::Result<T, E>;
