//! Error type of the application layer
//!
//! Wraps the index crate's taxonomy and adds configuration failures, so the
//! binary has one error to report.

use mt_index_core::IndexError;
use thiserror::Error;

/// Main result type of the application layer
pub type Result<T> = std::result::Result<T, Error>;

/// Application errors
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Index construction or model loading failed
    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    /// I/O errors from std
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }
}
