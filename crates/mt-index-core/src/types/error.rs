//! Error types for the indexing layer and its loaders
//!
//! Absent keys are never errors (lookups return `Option`). Everything here is
//! fatal for the load that produced it: the caller gets a diagnostic naming
//! the table and the sizes involved instead of a partially loaded model.

use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, IndexError>;

/// Errors raised while building or loading an index
#[derive(Error, Debug)]
pub enum IndexError {
    /// A fixed-capacity table has no free slot left for a new key
    #[error("{table} is full: capacity {capacity}, {observed} distinct keys inserted")]
    CapacityExhausted {
        /// Table that overflowed
        table: String,
        /// Configured capacity in slots
        capacity: usize,
        /// Distinct keys present when the insert failed
        observed: usize,
    },

    /// A packed key could not be decoded
    #[error("Malformed packed key: {reason}")]
    MalformedEncoding {
        /// What went wrong while decoding
        reason: String,
    },

    /// A token is too large for the packed encoding
    #[error("Token {value} exceeds the packable maximum {max}")]
    ValueTooWide {
        /// Offending token
        value: u32,
        /// Largest packable token
        max: u32,
    },

    /// A key of the wrong length was given to a fixed-length index
    #[error("Key length mismatch: expected {expected}, got {actual}")]
    KeyLength {
        /// Length the index was built for
        expected: usize,
        /// Length of the offending key
        actual: usize,
    },

    /// A numeric field in an input file failed to parse
    #[error("Invalid numeric literal {literal:?} on line {line}")]
    InvalidNumericLiteral {
        /// 1-based line number
        line: usize,
        /// Text that failed to parse
        literal: String,
    },

    /// An input file is structurally malformed
    #[error("Format error on line {line}: {message}")]
    Format {
        /// 1-based line number
        line: usize,
        /// Description of the problem
        message: String,
    },

    /// I/O errors from std
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IndexError {
    /// Shorthand for a [`IndexError::Format`] error.
    pub fn format(line: usize, message: impl Into<String>) -> Self {
        IndexError::Format { line, message: message.into() }
    }
}
