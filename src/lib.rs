//! MT Index - loading and querying decoder models
//!
//! Application layer over `mt-index-core`: configuration, logging setup and a
//! session that loads an ARPA language model and a phrase table and answers
//! per-sentence queries against them.
#![warn(missing_docs)]

// Core foundational modules
pub mod core;

// Loaded resources
pub mod session;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{reload, EnvFilter, Registry};

// Re-export commonly used items for convenience
pub use crate::core::{Config, Error, Result};
pub use session::Session;

/// Crate version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Filter handle returned by [`init_logging`], used to apply the configured
/// level once the configuration has been read.
pub struct LogHandle {
    handle: reload::Handle<EnvFilter, Registry>,
    from_env: bool,
}

impl LogHandle {
    /// Switch to `level`. A filter taken from `RUST_LOG` is left alone.
    pub fn set_level(&self, level: &str) -> Result<()> {
        if self.from_env {
            return Ok(());
        }
        self.handle
            .reload(EnvFilter::new(level))
            .map_err(|e| Error::config(format!("Failed to set log level {:?}: {}", level, e)))
    }
}

/// Initialize tracing. `RUST_LOG` wins over `default_level` when set.
///
/// Returns `None` when a subscriber is already installed (tests, embedding);
/// that subscriber is kept.
pub fn init_logging(default_level: &str) -> Option<LogHandle> {
    let (filter, from_env) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (EnvFilter::new(default_level), false),
    };
    let (filter, handle) = reload::Layer::new(filter);
    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .is_ok();

    tracing::info!("Initializing {} v{}", NAME, VERSION);
    installed.then_some(LogHandle { handle, from_env })
}
