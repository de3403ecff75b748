/*!
 * Error types for the lingosub application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 *
 * Two conditions that look like failures are deliberately *not* errors here:
 * a failed backend call for one batch is carried as
 * [`BatchOutcome::BackendFailure`](crate::translation::BatchOutcome), and a
 * response with the wrong number of lines is carried as
 * [`Alignment`](crate::translation::Alignment). Both are recovered per batch.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),
}

/// Errors raised while decoding or parsing a source document.
///
/// Any of these is fatal to the one document being read and to nothing else.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// Content is not valid UTF-8 (with or without signature)
    #[error("Content is not valid UTF-8: {0}")]
    Encoding(String),

    /// The structural grammar of the document was violated
    #[error("Malformed document at line {line}: {message}")]
    Malformed {
        /// One-based line number where parsing stopped
        line: usize,
        /// What the parser expected
        message: String,
    },

    /// The document contains no blocks at all
    #[error("Document contains no subtitle blocks")]
    Empty,
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from document parsing
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
