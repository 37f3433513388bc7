//! # Runtime Configuration Module
//!
//! Engine settings, layered in this order (later wins):
//!
//! 1. Built-in defaults
//! 2. An optional YAML file
//! 3. Environment variables
//!
//! ## Environment Variables
//!
//! | Variable            | Field           | Default          |
//! |---------------------|-----------------|------------------|
//! | `SIF_ACTION_DIR`    | `action_dir`    | `../action/`     |
//! | `SIF_CACHE_DIR`     | `cache_dir`     | `../cache/sif/`  |
//! | `SIF_CACHE_ENABLE`  | `cache_enabled` | `true`           |
//! | `SIF_MAX_CHAIN_LEN` | `max_chain_len` | `64`             |
//!
//! Unparseable values are ignored and the previous layer's value is kept.
//!
//! ## Example YAML
//!
//! ```yaml
//! action_dir: ./actions
//! cache_enabled: false
//! ```
//!
//! ```rust
//! use sifrouter::runtime_config::EngineConfig;
//!
//! let config = EngineConfig::default();
//! assert!(config.cache_enabled);
//! assert!(config.cache_path().is_some());
//! ```

use crate::catalog::{cache::CACHE_FILE_NAME, CatalogLoader};
use crate::dispatcher::DEFAULT_MAX_CHAIN_LEN;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Engine settings shared by the library entry points and the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory holding one route definition file per action.
    pub action_dir: PathBuf,
    /// Read and refresh the catalog cache artifact.
    pub cache_enabled: bool,
    /// Directory of the cache artifact.
    pub cache_dir: PathBuf,
    /// Longest chain a single request may build before it is aborted.
    pub max_chain_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            action_dir: PathBuf::from("../action/"),
            cache_enabled: true,
            cache_dir: PathBuf::from("../cache/sif/"),
            max_chain_len: DEFAULT_MAX_CHAIN_LEN,
        }
    }
}

fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl EngineConfig {
    /// Defaults overlaid with the environment.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Read a YAML file; keys it omits keep their defaults.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Full layering: defaults, then `path` when given, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Overlay `SIF_*` variables present in the process environment.
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| env::var(key).ok());
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = var("SIF_ACTION_DIR").filter(|v| !v.is_empty()) {
            self.action_dir = PathBuf::from(dir);
        }
        if let Some(dir) = var("SIF_CACHE_DIR").filter(|v| !v.is_empty()) {
            self.cache_dir = PathBuf::from(dir);
        }
        if let Some(enabled) = var("SIF_CACHE_ENABLE").as_deref().and_then(parse_bool) {
            self.cache_enabled = enabled;
        }
        if let Some(len) = var("SIF_MAX_CHAIN_LEN").and_then(|v| v.trim().parse().ok()) {
            self.max_chain_len = len;
        }
    }

    /// Location of the cache artifact, or `None` when caching is disabled.
    #[must_use]
    pub fn cache_path(&self) -> Option<PathBuf> {
        self.cache_enabled.then(|| self.cache_dir.join(CACHE_FILE_NAME))
    }

    /// A catalog loader for these settings.
    #[must_use]
    pub fn loader(&self) -> CatalogLoader {
        let loader = CatalogLoader::new(&self.action_dir);
        match self.cache_path() {
            Some(path) => loader.with_cache(path),
            None => loader,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.action_dir, PathBuf::from("../action/"));
        assert_eq!(
            config.cache_path(),
            Some(PathBuf::from("../cache/sif/configs.cache"))
        );
        assert_eq!(config.max_chain_len, 64);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = EngineConfig::default();
        config.apply_vars(vars(&[
            ("SIF_ACTION_DIR", "/srv/actions"),
            ("SIF_CACHE_ENABLE", "off"),
            ("SIF_MAX_CHAIN_LEN", "8"),
        ]));
        assert_eq!(config.action_dir, PathBuf::from("/srv/actions"));
        assert!(!config.cache_enabled);
        assert_eq!(config.cache_path(), None);
        assert_eq!(config.max_chain_len, 8);
    }

    #[test]
    fn test_invalid_env_values_ignored() {
        let mut config = EngineConfig::default();
        config.apply_vars(vars(&[
            ("SIF_CACHE_ENABLE", "maybe"),
            ("SIF_MAX_CHAIN_LEN", "lots"),
            ("SIF_ACTION_DIR", ""),
        ]));
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_yaml_partial_keeps_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("sif.yaml");
        std::fs::write(&path, "action_dir: ./actions\ncache_enabled: false\n").expect("write");
        let config = EngineConfig::from_yaml_file(&path).expect("parse");
        assert_eq!(config.action_dir, PathBuf::from("./actions"));
        assert!(!config.cache_enabled);
        assert_eq!(config.max_chain_len, DEFAULT_MAX_CHAIN_LEN);
    }

    #[test]
    fn test_missing_yaml_is_error() {
        assert!(EngineConfig::from_yaml_file(Path::new("/nonexistent/sif.yaml")).is_err());
    }
}
