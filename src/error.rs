//! Error types for the edge service.

use thiserror::Error;

/// Main error type for jlpt-edge operations.
#[derive(Error, Debug)]
pub enum EdgeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A language code that is not one of the supported locales
    #[error("Unsupported language: {0}")]
    InvalidLanguage(String),

    /// gRPC server errors
    #[error("gRPC error: {0}")]
    Grpc(#[from] tonic::transport::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for EdgeError {
    fn from(err: config::ConfigError) -> Self {
        EdgeError::Config(err.to_string())
    }
}

impl From<serde_yaml::Error> for EdgeError {
    fn from(err: serde_yaml::Error) -> Self {
        EdgeError::Config(err.to_string())
    }
}

impl From<crate::i18n::ParseLanguageError> for EdgeError {
    fn from(err: crate::i18n::ParseLanguageError) -> Self {
        EdgeError::InvalidLanguage(err.input)
    }
}

/// Result type alias for jlpt-edge operations.
pub type Result<T> = std::result::Result<T, EdgeError>;
