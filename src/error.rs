//! Error handling for the statlink telemetry crate.

/// A specialized `Result` type for statlink operations.
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// The main error type for statlink operations.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serial transport failure (open or write); always retryable
    #[error("Transport error: {0}")]
    Transport(String),

    /// Reading one hardware node's sensors failed
    #[error("Hardware read error: {0}")]
    HardwareRead(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic system error
    #[error("System error: {0}")]
    System(String),
}

impl TelemetryError {
    /// Create a new transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a new hardware read error
    pub fn hardware_read(msg: impl Into<String>) -> Self {
        Self::HardwareRead(msg.into())
    }

    /// Create a new configuration error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new generic system error
    pub fn system_error(msg: impl Into<String>) -> Self {
        Self::System(msg.into())
    }

    /// Whether this failure belongs to the serial transport and should be
    /// answered with the failure backoff rather than the normal cadence.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
