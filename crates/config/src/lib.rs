//! Configuration loading and credential resolution.
//!
//! Config files: `drawkit.toml`, `drawkit.yaml`, or `drawkit.json`
//! Searched in `./` then `~/.config/drawkit/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{config_dir, discover_and_load, load_config},
    schema::{DrawkitConfig, FallbackConfig, OpenRouterConfig, StorageConfig},
};
