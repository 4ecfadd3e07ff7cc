//! Option manifests: declaring a registry from a TOML or YAML file.
//!
//! ```yaml
//! options:
//!   flag:
//!     default: true
//!   database:
//!     default: config/database.yml
//!     config_file: true
//!     keys: [host, port]
//! ```

use crate::config_file::FileOptions;
use crate::error::ConfigError;
use crate::registry::OptionRegistry;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Declarations read from a manifest file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptionManifest {
    #[serde(default)]
    pub options: BTreeMap<String, OptionEntry>,
}

/// One declared option.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionEntry {
    /// Literal default, or the file path when `config_file` is set.
    #[serde(default)]
    pub default: Value,

    #[serde(default)]
    pub config_file: bool,

    #[serde(default = "default_true")]
    pub environment_based: bool,

    #[serde(default)]
    pub keys: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl OptionManifest {
    /// Read a manifest, choosing the parser from the file extension.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "toml" => Self::from_toml(&content),
            "yml" | "yaml" => Self::from_yaml(&content),
            other => Err(ConfigError::InvalidManifest(format!(
                "unsupported extension '.{}' for {}",
                other,
                path.display()
            ))),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::InvalidManifest(e.to_string()))
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::InvalidManifest(e.to_string()))
    }

    /// Declare every entry into `registry`.
    pub fn apply(&self, registry: &mut OptionRegistry) -> Result<(), ConfigError> {
        for (name, entry) in &self.options {
            if entry.config_file {
                let Value::String(path) = &entry.default else {
                    return Err(ConfigError::InvalidManifest(format!(
                        "option {} is a config file but its default is not a path",
                        name
                    )));
                };
                registry.config_file(
                    name.as_str(),
                    path.as_str(),
                    FileOptions::default()
                        .environment_based(entry.environment_based)
                        .keys(entry.keys.iter().cloned()),
                );
            } else {
                registry.option(name.as_str(), entry.default.clone());
            }
        }
        Ok(())
    }

    pub fn into_registry(self) -> Result<OptionRegistry, ConfigError> {
        let mut registry = OptionRegistry::new();
        self.apply(&mut registry)?;
        Ok(registry)
    }
}
