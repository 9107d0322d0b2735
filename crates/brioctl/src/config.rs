//! Configuration for brioctl.
//!
//! Loads `$BRIO_CONFIG`, else `<config_dir>/brio/config.toml`, else defaults.
//! Every field has a default, so a partial file is fine.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment override for the config file path
pub const CONFIG_ENV: &str = "BRIO_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrioConfig {
    /// Where per-user memory and week files live
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_user")]
    pub user: String,

    /// Delay between message lines in chat (0 disables pacing)
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,

    /// Fixed seed for protocol and technique selection
    #[serde(default)]
    pub seed: Option<u64>,

    /// Default tracing filter when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("brio")
}

fn default_user() -> String {
    "local".to_string()
}

fn default_pacing_ms() -> u64 {
    450
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for BrioConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            user: default_user(),
            pacing_ms: default_pacing_ms(),
            seed: None,
            log_level: default_log_level(),
        }
    }
}

impl BrioConfig {
    /// Config path: explicit, then `$BRIO_CONFIG`, then the XDG location
    pub fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join("brio").join("config.toml"))
    }

    /// Load config. A missing file yields defaults; a malformed one is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match Self::resolve_path(explicit) {
            Some(path) if path.exists() => Self::load_from_path(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: BrioConfig = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: BrioConfig = toml::from_str("user = \"lucia\"\nseed = 9\n").unwrap();
        assert_eq!(config.user, "lucia");
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.pacing_ms, default_pacing_ms());
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_empty_config_is_default() {
        let config: BrioConfig = toml::from_str("").unwrap();
        assert_eq!(config, BrioConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "data_dir = \"/tmp/brio-data\"\npacing_ms = 0\n").unwrap();

        let config = BrioConfig::load(Some(&path)).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/brio-data"));
        assert_eq!(config.pacing_ms, 0);
        assert_eq!(config.user, "local");
    }

    #[test]
    fn test_malformed_file_is_an_error_and_missing_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "pacing_ms = \"rápido\"").unwrap();
        assert!(BrioConfig::load(Some(&path)).is_err());

        let missing = dir.path().join("nope.toml");
        assert_eq!(BrioConfig::load(Some(&missing)).unwrap(), BrioConfig::default());
    }

    #[test]
    fn test_explicit_path_wins() {
        let path = Path::new("/tmp/brio-test.toml");
        assert_eq!(BrioConfig::resolve_path(Some(path)), Some(path.to_path_buf()));
    }
}
