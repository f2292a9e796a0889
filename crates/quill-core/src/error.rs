//! Error types for quill-core

use thiserror::Error;

/// Result type alias using quill-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in quill-core operations.
///
/// Every backend failure funnels into this one type; its `Display` output is
/// the human-readable message shown to the user.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP transport error talking to the remote API
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote API answered with a non-success status
    #[error("{0}")]
    Api(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Note not found
    #[error("Note not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_displays_raw_message() {
        let error = Error::Api("quota exceeded".to_string());
        assert_eq!(error.to_string(), "quota exceeded");
    }

    #[test]
    fn io_error_converts_with_prefix() {
        let error: Error = std::io::Error::new(std::io::ErrorKind::Other, "disk full").into();
        assert_eq!(error.to_string(), "IO error: disk full");
    }
}
