//! Error handling for the CV matcher

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatcherError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification used by the shells to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Input,
    Extraction,
    Model,
    Internal,
}

impl ErrorKind {
    /// Input and extraction failures are the caller's fault; everything else is ours.
    pub fn is_caller_fault(self) -> bool {
        matches!(self, ErrorKind::Input | ErrorKind::Extraction)
    }
}

impl MatcherError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MatcherError::InvalidInput(_) | MatcherError::EmptyInput(_) => ErrorKind::Input,
            MatcherError::Extraction(_) => ErrorKind::Extraction,
            MatcherError::Model(_) => ErrorKind::Model,
            MatcherError::Configuration(_)
            | MatcherError::Io(_)
            | MatcherError::Serialization(_)
            | MatcherError::Internal(_) => ErrorKind::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, MatcherError>;

/// Convert candle core errors to our custom error type
impl From<candle_core::Error> for MatcherError {
    fn from(err: candle_core::Error) -> Self {
        MatcherError::Model(err.to_string())
    }
}
