pub mod types;

use crate::error::{ConfigError, Result};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = ".lhmon.toml";

/// Get the global config file path (~/.lhmon.toml)
pub fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(CONFIG_FILE_NAME))
}

/// Get the local config file path (./.lhmon.toml)
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE_NAME)
}

/// Load configuration from file or use defaults.
///
/// An explicit path must exist. Otherwise the current directory is checked
/// first, then the home directory.
pub fn load_config(explicit: Option<&Path>) -> Result<types::Config> {
    let local = std::env::current_dir()
        .ok()
        .map(|dir| local_config_path(&dir));
    load_config_from(explicit, local, global_config_path())
}

fn load_config_from(
    explicit: Option<&Path>,
    local: Option<PathBuf>,
    global: Option<PathBuf>,
) -> Result<types::Config> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()).into());
        }
        return read_config(path);
    }

    for candidate in [local, global].into_iter().flatten() {
        if candidate.exists() {
            return read_config(&candidate);
        }
    }

    log::debug!("No {} found, using defaults", CONFIG_FILE_NAME);
    Ok(types::Config::default())
}

fn read_config(path: &Path) -> Result<types::Config> {
    log::debug!("Loading configuration from {}", path.display());
    let content = fs::read_to_string(path)?;
    let config: types::Config = toml::from_str(&content)
        .map_err(|e| ConfigError::ParsingFailed(format!("{}: {}", path.display(), e)))?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &types::Config) -> Result<()> {
    if config.watch.interval_secs == 0 {
        return Err(ConfigError::Invalid("watch.interval_secs must be at least 1".to_string()).into());
    }
    if config.cluster.namespace.is_empty() {
        return Err(ConfigError::Invalid("cluster.namespace must not be empty".to_string()).into());
    }
    Ok(())
}
