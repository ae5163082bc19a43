//! Error handling for the turnover client

use std::fmt;
use thiserror::Error;

/// Unified error type for the turnover client
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid user input, caught before any remote call
    #[error("{0}")]
    Validation(String),

    /// The backend answered with a non-success status
    #[error("{message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Human readable message extracted from the response body
        message: String,
    },

    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Auth(String),

    /// No session is available for an operation that needs one
    #[error("Not signed in")]
    NotAuthenticated,

    /// The signed-in identity may not perform the operation
    #[error("Not allowed: {0}")]
    Forbidden(String),

    /// Database query errors that are not plain API failures
    #[error("Database error: {0}")]
    Database(String),

    /// Edge Function errors
    #[error("Function error: {0}")]
    Function(String),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// JWT errors
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new validation error
    pub fn validation<T: fmt::Display>(msg: T) -> Self {
        Error::Validation(msg.to_string())
    }

    /// Create a new authentication error
    pub fn auth<T: fmt::Display>(msg: T) -> Self {
        Error::Auth(msg.to_string())
    }

    /// Create a new forbidden error
    pub fn forbidden<T: fmt::Display>(msg: T) -> Self {
        Error::Forbidden(msg.to_string())
    }

    /// Create a new database error
    pub fn database<T: fmt::Display>(msg: T) -> Self {
        Error::Database(msg.to_string())
    }

    /// Create a new function error
    pub fn function<T: fmt::Display>(msg: T) -> Self {
        Error::Function(msg.to_string())
    }

    /// Create a new configuration error
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }

    /// Whether the error came from checking user input
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Whether the caller should be sent back to the login page instead of
    /// being shown the message
    pub fn requires_login(&self) -> bool {
        match self {
            Error::NotAuthenticated | Error::Jwt(_) => true,
            Error::Api { status, .. } => *status == 401,
            _ => false,
        }
    }

    /// The text shown to the user in a blocking dialog
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation(msg)
            | Error::Auth(msg)
            | Error::Database(msg)
            | Error::Function(msg) => msg.clone(),
            Error::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_displays_remote_message_verbatim() {
        let err = Error::Api {
            status: 409,
            message: "duplicate key value violates unique constraint".to_string(),
        };
        assert_eq!(
            err.user_message(),
            "duplicate key value violates unique constraint"
        );
        assert_eq!(err.to_string(), err.user_message());
        assert!(!err.requires_login());
    }

    #[test]
    fn test_classification() {
        assert!(Error::validation("bad date").is_validation());
        assert!(Error::NotAuthenticated.requires_login());
        assert!(Error::Api { status: 401, message: "JWT expired".into() }.requires_login());
        assert!(!Error::forbidden("hosts only").requires_login());
    }
}
