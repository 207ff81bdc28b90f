// Command handlers module
pub mod config;
pub mod print;
pub mod run;
pub mod values;

use anyhow::Result;
use std::path::PathBuf;

use crate::core::config::Settings;

/// Settings file chosen by `--config`, falling back to the default location
pub fn resolve_config_path(matches: &clap::ArgMatches) -> Result<PathBuf> {
    match matches.get_one::<String>("config") {
        Some(path) => Ok(PathBuf::from(path)),
        None => Ok(Settings::config_path()?),
    }
}

// Re-exports for cleaner imports
pub use print::execute as print;
pub use run::execute as run;
pub use values::execute as values;
