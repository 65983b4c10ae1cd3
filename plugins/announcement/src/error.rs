use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MonitorError {
    #[error("plugin is disabled")]
    Disabled,

    #[error("source '{source_name}' has no polling interval")]
    ZeroInterval { source_name: String },

    #[error("stop timeout after {0:?}")]
    StopTimeout(Duration),
}
