//! Configuration for salon-desk.
//!
//! Settings are TOML at the platform's XDG config path
//! (e.g. `~/.config/salon-desk/config.toml` on Linux), optionally overridden
//! by a `salon.toml` in the working directory or one of its parents.

mod loader;
mod paths;
mod resolve;
mod types;

pub use types::Config;

use anyhow::Result;

impl Config {
    /// Load config with precedence: project > global > defaults.
    /// Creates default config file if none exists.
    pub fn load() -> Result<Self> {
        let global = Self::load_global()?;
        let project = Self::load_project()?;

        let mut config = global;
        if let Some(proj) = project {
            config = Self::merge(config, proj);
        }

        config.resolve_substitutions();
        Ok(config)
    }
}
