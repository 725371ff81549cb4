//! Error types for the logging subsystem

use thiserror::Error;

/// Errors that can occur while setting up logging
#[derive(Error, Debug)]
pub enum LoggingError {
    /// The global subscriber could not be installed
    #[error("Logging initialization failed: {0}")]
    InitializationFailed(String),
}
