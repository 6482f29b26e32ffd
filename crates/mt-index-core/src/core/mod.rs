//! Cross-cutting helpers

/// Logging macros
pub mod logging;
