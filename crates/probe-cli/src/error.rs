//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Required settings are absent
    #[error("Missing required configuration: {}", .0.join(", "))]
    MissingConfig(Vec<String>),

    /// MCP client error
    #[error(transparent)]
    Client(#[from] probe_client::ClientError),

    /// Token acquisition or inspection error
    #[error(transparent)]
    Auth(#[from] probe_auth::AuthError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A tool call succeeded at the protocol level but the tool reported failure
    #[error("Tool '{0}' reported an error")]
    ToolFailed(String),
}

impl CliError {
    /// Remediation hint, when the underlying failure has a known cause
    pub fn diagnosis(&self) -> Option<&'static str> {
        match self {
            CliError::Auth(e) => e.diagnosis(),
            _ => None,
        }
    }
}
