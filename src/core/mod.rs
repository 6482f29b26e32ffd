//! Core application types
//!
//! Configuration loading and the application error type.

pub mod config;
pub mod error;

// Re-export commonly used items
pub use config::{load_config, load_config_or_default, Config};
pub use error::{Error, Result};
