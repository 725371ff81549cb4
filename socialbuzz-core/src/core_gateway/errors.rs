//! Error types for core_gateway

use thiserror::Error;

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Failure surface of the remote transport.
///
/// The gateway never interprets payload semantics; these variants only
/// describe how a request failed to cross the process boundary.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Connectivity failure: the transport gave up before a response
    /// arrived (includes timeouts)
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered with a non-2xx status
    #[error("Server error: status {status}")]
    Server { status: u16 },

    /// The response body could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            GatewayError::Serialization(e.to_string())
        } else {
            GatewayError::Network(e.to_string())
        }
    }
}
