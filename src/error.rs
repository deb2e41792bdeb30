//! Error types for the unistorage client.

use thiserror::Error;

/// Errors that can occur while talking to the Unistorage API.
#[derive(Error, Debug)]
pub enum UnistorageError {
    /// The request timed out at the transport level.
    #[error("Unistorage API request timed out")]
    Timeout,

    /// The API answered with a non-2xx status.
    #[error("<{status_code}: {message}>")]
    Api {
        /// HTTP status code of the response.
        status_code: u16,
        /// The `msg` field of the JSON body, or the raw body.
        message: String,
    },

    /// A 2xx response whose body is not valid JSON.
    #[error("Unistorage API returned invalid JSON: {0}")]
    MalformedResponse(String),

    /// Valid JSON that does not describe any known resource shape.
    #[error("Unrecognized response shape: {0}")]
    UnrecognizedShape(String),

    /// Any other transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// An I/O error occurred while reading upload content.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The base URL or a resource reference could not be turned into a URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// An encoded action could not be decoded.
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Client configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for Results using UnistorageError.
pub type Result<T> = std::result::Result<T, UnistorageError>;
