//! # vault2org configuration
//!
//! Type-safe configuration for a vault conversion run, loaded from TOML.
//!
//! ## Sources
//!
//! 1. Built-in defaults (match the behaviour of a plain `vault2org IN OUT`)
//! 2. `~/.config/vault2org/config.toml`, or the file given with `--config`
//! 3. Command-line overrides, applied by the binary
//!
//! ```rust,no_run
//! use vault2org_config::Config;
//!
//! let config = Config::load(None)?;
//! assert!(config.effective_jobs() >= 1);
//! # Ok::<(), vault2org_config::ConfigError>(())
//! ```

#![warn(clippy::all)]

mod config;
mod error;
mod loader;

pub use config::*;
pub use error::ConfigError;
pub use loader::default_config_path;
