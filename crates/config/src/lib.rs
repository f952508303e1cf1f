//! Configuration loading and environment-variable substitution.
//!
//! Config file: `signalrt.toml`, searched in `./` then
//! `~/.config/signalrt/`. Supports `${ENV_VAR}` substitution in all
//! string values, plus a `SIGNALRT_`-prefixed environment overlay
//! applied after the file is loaded.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use loader::{
    apply_env_overrides, config_dir, discover_and_load, find_or_default_config_path, load_config,
    save_config,
};
pub use schema::{
    BackpressurePolicy, CircuitBreakerConfig, HttpConfig, RateLimitConfig, SignalrtConfig,
    StorageConfig, StorageType,
};
