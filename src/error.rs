// src/error.rs

//! Unified error handling for the crawler core.

use std::fmt;

use thiserror::Error;

/// Result type alias for crawler operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Lookup regex failed to compile
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Malformed source record
    #[error("Input error for {context}: {message}")]
    Input { context: String, message: String },

    /// A FAIL assertion was violated; the run must not be published
    #[error("Assertion failed: {rule} (observed: {observed})")]
    AssertionFailed { rule: String, observed: u64 },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an input error with context.
    pub fn input(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Input {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Whether this error aborts the run because of a data assertion.
    pub fn is_assertion_failure(&self) -> bool {
        matches!(self, Self::AssertionFailed { .. })
    }
}
