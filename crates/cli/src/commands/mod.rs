pub mod ask;
pub mod hash_password;
pub mod init;
pub mod serve;

use std::path::{Path, PathBuf};

use ragguard_config::AppConfig;

/// The config file used when `--config` is not given.
pub fn default_config_path() -> PathBuf {
    AppConfig::config_dir().join("config.toml")
}

/// Load the config from `path` (or the default location) with environment
/// overrides applied.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => AppConfig::load_with_env(path),
        None => AppConfig::load(),
    };
    Ok(config.map_err(|e| format!("Failed to load config: {e}"))?)
}
