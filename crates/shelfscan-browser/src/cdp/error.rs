//! CDP error types.

use thiserror::Error;

/// CDP client errors.
#[derive(Debug, Error)]
pub enum CdpError {
    /// Failed to connect to Chrome.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Nothing answers on the debugging endpoint.
    #[error("Chrome not available at {0}")]
    ChromeNotAvailable(String),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Error object returned by the browser for a command.
    #[error("CDP error: {message} (code: {code})")]
    Protocol { code: i64, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error (for endpoint discovery and target creation).
    #[error("HTTP error: {0}")]
    Http(String),

    /// `Page.navigate` reported an error text.
    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    /// Script threw inside the page.
    #[error("JavaScript error: {0}")]
    JavaScript(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    /// The WebSocket went away before the response arrived.
    #[error("Session closed")]
    SessionClosed,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl CdpError {
    /// Whether the error refers to a remote object or execution context
    /// that no longer exists, typically after a navigation.
    pub fn is_stale_reference(&self) -> bool {
        match self {
            CdpError::Protocol { message, .. } => {
                message.contains("Could not find object with given id")
                    || message.contains("Cannot find context with specified id")
                    || message.contains("Node is detached")
            }
            _ => false,
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for CdpError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        CdpError::WebSocket(e.to_string())
    }
}

impl From<reqwest::Error> for CdpError {
    fn from(e: reqwest::Error) -> Self {
        CdpError::Http(e.to_string())
    }
}

impl From<url::ParseError> for CdpError {
    fn from(e: url::ParseError) -> Self {
        CdpError::ConnectionFailed(format!("Invalid URL: {}", e))
    }
}
