use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{env_subst::substitute_env, schema::SignalrtConfig};

/// Standard config file name.
const CONFIG_FILENAME: &str = "signalrt.toml";

/// Load config from the given TOML file, with `${ENV_VAR}` substitution.
pub fn load_config(path: &Path) -> anyhow::Result<SignalrtConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    Ok(toml::from_str(&raw)?)
}

/// Discover and load config from standard locations, then apply the
/// `SIGNALRT_`-prefixed environment-variable overlay.
///
/// Search order:
/// 1. `./signalrt.toml` (project-local)
/// 2. `~/.config/signalrt/signalrt.toml` (user-global)
///
/// Returns `SignalrtConfig::default()` (overlaid with env vars) if no
/// config file is found.
pub fn discover_and_load() -> SignalrtConfig {
    let mut cfg = if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
                SignalrtConfig::default()
            },
        }
    } else {
        debug!("no config file found, using defaults");
        SignalrtConfig::default()
    };
    apply_env_overrides(&mut cfg);
    cfg
}

/// Overlay a handful of commonly-overridden keys from the process
/// environment (`SIGNALRT_PHONE_NUMBER`, `SIGNALRT_BASE_URL`,
/// `SIGNALRT_SIGNAL_SERVICE`), matching the teacher's layered
/// file-then-env config convention.
pub fn apply_env_overrides(cfg: &mut SignalrtConfig) {
    if let Ok(v) = std::env::var("SIGNALRT_PHONE_NUMBER") {
        cfg.phone_number = v;
    }
    if let Ok(v) = std::env::var("SIGNALRT_BASE_URL") {
        cfg.base_url = v;
    }
    if let Ok(v) = std::env::var("SIGNALRT_SIGNAL_SERVICE") {
        cfg.signal_service = v;
    }
}

/// Find the config file in standard locations.
fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILENAME);
    if local.exists() {
        return Some(local);
    }

    if let Some(dirs) = directories::ProjectDirs::from("", "", "signalrt") {
        let p = dirs.config_dir().join(CONFIG_FILENAME);
        if p.exists() {
            return Some(p);
        }
    }

    None
}

/// Returns the user-global config directory (`~/.config/signalrt/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "signalrt").map(|d| d.config_dir().to_path_buf())
}

/// Returns the path of an existing config file, or the default path.
pub fn find_or_default_config_path() -> PathBuf {
    if let Some(path) = find_config_file() {
        return path;
    }
    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_FILENAME)
}

/// Serialize `config` to TOML and write it to the user-global config path.
///
/// Creates parent directories if needed. Returns the path written to.
pub fn save_config(config: &SignalrtConfig) -> anyhow::Result<PathBuf> {
    let path = find_or_default_config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("serialize config: {e}"))?;
    std::fs::write(&path, toml_str)?;
    debug!(path = %path.display(), "saved config");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_config_applies_env_substitution() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        // SAFETY: test-local process env var, no concurrent access.
        unsafe {
            std::env::set_var("SIGNALRT_TEST_PHONE", "+19995551234");
        }
        std::fs::write(&path, r#"phone_number = "${SIGNALRT_TEST_PHONE}""#).unwrap();
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.phone_number, "+19995551234");
        unsafe {
            std::env::remove_var("SIGNALRT_TEST_PHONE");
        }
    }

    #[test]
    fn save_and_reload_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        let cfg = SignalrtConfig {
            phone_number: "+15551230000".to_string(),
            ..Default::default()
        };
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        std::fs::write(&path, toml_str).unwrap();
        let reloaded = load_config(&path).unwrap();
        assert_eq!(reloaded.phone_number, cfg.phone_number);
    }

    #[test]
    fn apply_env_overrides_overrides_base_url() {
        let mut cfg = SignalrtConfig::default();
        unsafe {
            std::env::set_var("SIGNALRT_BASE_URL", "http://example.invalid:9000");
        }
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.base_url, "http://example.invalid:9000");
        unsafe {
            std::env::remove_var("SIGNALRT_BASE_URL");
        }
    }
}
