//! Domain error types

use thiserror::Error;

/// Errors that can occur while talking to a Firmata board
#[derive(Error, Debug)]
pub enum FirmataError {
    #[error("Serial port error: {0}")]
    Serial(String),

    #[error("Firmata protocol error: {0}")]
    Protocol(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for Firmata operations
pub type FirmataResult<T> = Result<T, FirmataError>;
