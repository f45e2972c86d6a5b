//! HTTP-level error types

use thiserror::Error;

/// Errors raised while building requests or responses
#[derive(Debug, Error)]
pub enum HttpError {
    /// Invalid header name or value
    #[error("Invalid header: {message}")]
    InvalidHeader { message: String },

    /// Body serialization failed
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl HttpError {
    /// Create an invalid header error
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }
}

/// HTTP result type alias
pub type HttpResult<T> = Result<T, HttpError>;
