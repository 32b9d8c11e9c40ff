//! Locations of MDT state and configuration files.
//!
//! # Environment Variables
//!
//! - `MDT_STATE_DIR`: Override the base state directory (default `~/.mdt`)
//! - `MDT_CONFIG_DIR`: Override the config directory
//! - `MDT_REGISTRY_PATH`: Use this agent registry file

use std::path::PathBuf;
use std::sync::OnceLock;

/// Environment variable for custom state directory.
pub const STATE_DIR_ENV: &str = "MDT_STATE_DIR";

/// Environment variable for custom config directory.
pub const CONFIG_DIR_ENV: &str = "MDT_CONFIG_DIR";

/// Environment variable pointing at the agent registry file.
pub const REGISTRY_PATH_ENV: &str = "MDT_REGISTRY_PATH";

/// File name of the agent registry document.
pub const REGISTRY_FILE_NAME: &str = "agent_registry.json";

const DEFAULT_STATE_DIR: &str = ".mdt";
const CONFIG_SUBDIR: &str = "config";

static STATE_DIR_CACHE: OnceLock<PathBuf> = OnceLock::new();

/// Get the MDT state directory.
///
/// 1. `MDT_STATE_DIR` if set
/// 2. `~/.mdt` if a home directory is available
/// 3. `.mdt` in the current directory
pub fn state_dir() -> PathBuf {
    STATE_DIR_CACHE
        .get_or_init(|| {
            std::env::var(STATE_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    dirs::home_dir()
                        .map(|h| h.join(DEFAULT_STATE_DIR))
                        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
                })
        })
        .clone()
}

/// Get the user config directory.
pub fn config_dir() -> PathBuf {
    std::env::var(CONFIG_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| state_dir().join(CONFIG_SUBDIR))
}

/// Get the agent registry file.
///
/// `MDT_REGISTRY_PATH` wins. Otherwise a `config/agent_registry.json` in the
/// working directory is used when present, falling back to the user config
/// directory.
pub fn registry_file() -> PathBuf {
    if let Ok(path) = std::env::var(REGISTRY_PATH_ENV) {
        return PathBuf::from(path);
    }

    let local = PathBuf::from(CONFIG_SUBDIR).join(REGISTRY_FILE_NAME);
    if local.exists() {
        return local;
    }

    config_dir().join(REGISTRY_FILE_NAME)
}

/// Get the .env.local file path (API keys).
pub fn env_file() -> PathBuf {
    config_dir().join(".env.local")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_nest_under_state_dir() {
        if std::env::var(CONFIG_DIR_ENV).is_err() {
            assert!(config_dir().starts_with(state_dir()));
        }
        assert!(env_file().ends_with(".env.local"));
    }

    #[test]
    fn test_registry_file_name() {
        assert!(registry_file().ends_with(REGISTRY_FILE_NAME) || std::env::var(REGISTRY_PATH_ENV).is_ok());
    }
}
