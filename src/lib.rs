// Obidome Library - Public API

// Re-export error types
pub mod error;
pub use error::{ObidomeError, Result};

// Module declarations
pub mod commands;
pub mod core;
pub mod platform;
pub mod ui;

// Re-export commonly used types
pub use crate::core::config::Settings;
pub use crate::core::values::{MetricValue, ValueFetcher};

/// Initialize logging. `RUST_LOG` wins over the default level.
pub fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).parse_default_env();
    // A second init (e.g. from tests) is harmless
    let _ = builder.try_init();
}
