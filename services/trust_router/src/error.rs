//! Error types for the trust router daemon

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] codec::ProtocolError),

    #[error("Configuration error: {0}")]
    Config(#[from] router_config::ConfigError),

    #[error("Expected an update message, got {message_type}")]
    NotAnUpdate { message_type: String },

    #[error("Unknown monitoring command '{0}'")]
    UnknownMonitorCommand(String),
}

pub type Result<T> = std::result::Result<T, RouterError>;
