use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::layout::{LayoutKind, PhysicsConfig, Viewport};

pub const DEFAULT_DATA_SOURCE: &str = "sample.ttl";
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/sparql";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkbenchConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub sparql: SparqlConfig,
    #[serde(default)]
    pub viewport: Viewport,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub physics: PhysicsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// File path or http(s) URL of the Turtle document.
    #[serde(default = "default_source")]
    pub source: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
        }
    }
}

fn default_source() -> String {
    DEFAULT_DATA_SOURCE.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparqlConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

impl Default for SparqlConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default)]
    pub default: LayoutKind,
}

impl WorkbenchConfig {
    /// Get the configuration directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("ontobench");
        Ok(config_dir)
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load the user's configuration, falling back to defaults when there is none.
    pub fn load_or_default() -> Result<Self> {
        let path = match Self::config_path() {
            Ok(path) => path,
            Err(e) => {
                warn!("{e}; using default configuration");
                return Ok(Self::default());
            }
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(
                "No configuration at {}; using defaults (run 'ontobench init' to create one)",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: WorkbenchConfig = toml::from_str(content)?;
        config.expand_env_vars();
        config.physics = config.physics.clamped();
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory at {}", parent.display())
            })?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file at {}", path.display()))
    }

    /// Expand environment variables in configuration values
    fn expand_env_vars(&mut self) {
        let endpoint = expand_env_var(&self.sparql.endpoint);
        if endpoint.is_empty() {
            warn!(
                "SPARQL endpoint '{}' expanded to nothing; using {}",
                self.sparql.endpoint, DEFAULT_ENDPOINT
            );
            self.sparql.endpoint = default_endpoint();
        } else {
            self.sparql.endpoint = endpoint;
        }
        self.data.source = expand_env_var(&self.data.source);
        if self.data.source.is_empty() {
            self.data.source = default_source();
        }
    }
}

/// Expand environment variable references like ${VAR_NAME}
fn expand_env_var(value: &str) -> String {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).unwrap_or_default()
    } else if let Some(var_name) = value.strip_prefix('$') {
        std::env::var(var_name).unwrap_or_default()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_expand_env_var_braces() {
        // SAFETY: test is single-threaded
        unsafe { std::env::set_var("ONTOBENCH_TEST_VAR_A", "value_a") };
        assert_eq!(expand_env_var("${ONTOBENCH_TEST_VAR_A}"), "value_a");
        unsafe { std::env::remove_var("ONTOBENCH_TEST_VAR_A") };
    }

    #[test]
    fn test_expand_env_var_dollar() {
        unsafe { std::env::set_var("ONTOBENCH_TEST_VAR_B", "value_b") };
        assert_eq!(expand_env_var("$ONTOBENCH_TEST_VAR_B"), "value_b");
        unsafe { std::env::remove_var("ONTOBENCH_TEST_VAR_B") };
    }

    #[test]
    fn test_expand_env_var_literal() {
        assert_eq!(expand_env_var("http://localhost:8000/sparql"), "http://localhost:8000/sparql");
        assert_eq!(expand_env_var("${DEFINITELY_NOT_SET_XYZ_123}"), "");
    }

    #[test]
    fn test_defaults() {
        let config = WorkbenchConfig::default();
        assert_eq!(config.data.source, "sample.ttl");
        assert_eq!(config.sparql.endpoint, "http://localhost:8000/sparql");
        assert_eq!(config.viewport, Viewport::new(1200.0, 800.0));
        assert_eq!(config.layout.default, LayoutKind::ForceDirected);
        assert_eq!(config.physics, PhysicsConfig::default());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = WorkbenchConfig::from_toml(
            r#"
            [layout]
            default = "radial"

            [physics]
            link_distance = 150.0
            "#,
        )
        .unwrap();
        assert_eq!(config.layout.default, LayoutKind::Radial);
        assert_eq!(config.physics.link_distance, 150.0);
        assert_eq!(config.physics.charge_strength, PhysicsConfig::default().charge_strength);
        assert_eq!(config.data.source, DEFAULT_DATA_SOURCE);
    }

    #[test]
    fn test_physics_values_are_clamped() {
        let config = WorkbenchConfig::from_toml("[physics]\nlink_distance = 10000.0\n").unwrap();
        assert!(config.physics.link_distance < 10000.0);
    }

    #[test]
    fn test_unset_endpoint_variable_falls_back() {
        let config = WorkbenchConfig::from_toml(
            "[sparql]\nendpoint = \"${ONTOBENCH_DEFINITELY_UNSET}\"\n",
        )
        .unwrap();
        assert_eq!(config.sparql.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(WorkbenchConfig::from_toml("[layout]\ndefault = \"spiral\"\n").is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = WorkbenchConfig::default();
        config.data.source = "https://example.org/infra.ttl".into();
        config.layout.default = LayoutKind::Tree;
        config.save(&path).unwrap();

        let loaded = WorkbenchConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let loaded = WorkbenchConfig::load_from(&dir.path().join("none.toml")).unwrap();
        assert_eq!(loaded, WorkbenchConfig::default());
    }
}
