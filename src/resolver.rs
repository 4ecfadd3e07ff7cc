//! Configuration resolution
//!
//! Merges an [`OptionRegistry`]'s defaults with caller overrides for one environment.
//! Literal defaults are deep-copied (handles are shared), literal overrides are used
//! verbatim, and file-backed options are loaded fresh on every call.

use crate::config_file::ResolvedConfig;
use crate::error::ConfigError;
use crate::registry::{Descriptor, OptionRegistry};
use crate::value::{Handle, OptionValue};
use serde::de::DeserializeOwned;
use serde_yaml::Value;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Per-call overrides, keyed by option name.
pub type Overrides = BTreeMap<String, OptionValue>;

/// One entry of a resolved configuration.
#[derive(Debug, Clone)]
pub enum Resolved {
    /// A literal default (copied) or a literal override.
    Value(OptionValue),
    /// Data loaded for a file-backed option.
    File(ResolvedConfig),
    /// A file-backed option explicitly cleared by a `null`/`false` override.
    Absent,
}

/// The merged configuration for one environment.
#[derive(Debug, Clone, Default)]
pub struct Configuration {
    entries: BTreeMap<String, Resolved>,
}

impl Configuration {
    pub fn get(&self, name: &str) -> Option<&Resolved> {
        self.entries.get(name)
    }

    /// Data view of an entry. `None` for missing, absent, or handle entries.
    pub fn value(&self, name: &str) -> Option<&Value> {
        match self.entries.get(name)? {
            Resolved::Value(OptionValue::Data(value)) => Some(value),
            Resolved::File(config) => Some(config.data()),
            Resolved::Value(OptionValue::Handle(_)) | Resolved::Absent => None,
        }
    }

    /// Mutable data view, for callers that adjust their own snapshot.
    pub fn value_mut(&mut self, name: &str) -> Option<&mut Value> {
        match self.entries.get_mut(name)? {
            Resolved::Value(OptionValue::Data(value)) => Some(value),
            _ => None,
        }
    }

    pub fn file(&self, name: &str) -> Option<&ResolvedConfig> {
        match self.entries.get(name)? {
            Resolved::File(config) => Some(config),
            _ => None,
        }
    }

    pub fn handle(&self, name: &str) -> Option<&Handle> {
        match self.entries.get(name)? {
            Resolved::Value(value) => value.as_handle(),
            _ => None,
        }
    }

    /// True when the option is present but was cleared by an override.
    pub fn is_absent(&self, name: &str) -> bool {
        matches!(self.entries.get(name), Some(Resolved::Absent))
    }

    /// Load `environment` for a file-backed entry.
    pub fn alternate(&self, name: &str, environment: &str) -> Result<ResolvedConfig, ConfigError> {
        self.file(name)
            .ok_or(ConfigError::NotEnvironmentBased)?
            .alternate(environment)
    }

    /// Deserialize an entry's data into `T`. Absent entries deserialize from `null`.
    pub fn deserialize<T: DeserializeOwned>(&self, name: &str) -> Result<T, ConfigError> {
        let data = match self.entries.get(name) {
            Some(Resolved::Value(OptionValue::Data(value))) => value.clone(),
            Some(Resolved::File(config)) => config.data().clone(),
            Some(Resolved::Absent) => Value::Null,
            Some(Resolved::Value(OptionValue::Handle(_))) => {
                return Err(ConfigError::InvalidOverride {
                    option: name.to_string(),
                    reason: "handles cannot be deserialized".to_string(),
                })
            }
            None => return Err(ConfigError::UnknownOption(vec![name.to_string()])),
        };
        serde_yaml::from_value(data).map_err(|source| ConfigError::Deserialize {
            option: name.to_string(),
            source,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Resolved)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolve `registry` for `environment`.
///
/// Override names are checked before any file is touched; an unknown name fails the
/// whole call with [`ConfigError::UnknownOption`].
pub fn resolve(
    registry: &OptionRegistry,
    environment: &str,
    overrides: &Overrides,
) -> Result<Configuration, ConfigError> {
    check_overrides(registry, overrides)?;

    let mut entries = BTreeMap::new();
    for (name, descriptor) in registry.options() {
        let resolved = match (descriptor, overrides.get(name)) {
            (Descriptor::File(file), Some(alternate)) => {
                debug!(option = %name, "Applying override to file-backed option");
                let loaded = file
                    .load_from_alternate(environment, alternate)
                    .map_err(|err| match err {
                        ConfigError::InvalidOverride { reason, .. } => {
                            ConfigError::InvalidOverride {
                                option: name.clone(),
                                reason,
                            }
                        }
                        other => other,
                    })?;
                match loaded {
                    Some(config) => Resolved::File(config),
                    None => Resolved::Absent,
                }
            }
            (Descriptor::File(file), None) => Resolved::File(file.load(environment)?),
            (Descriptor::Literal(_), Some(value)) => {
                debug!(option = %name, "Applying literal override");
                Resolved::Value(value.clone())
            }
            (Descriptor::Literal(default), None) => Resolved::Value(default.duplicate()),
        };
        entries.insert(name.clone(), resolved);
    }

    info!(
        environment = %environment,
        options = entries.len(),
        overrides = overrides.len(),
        "Resolved configuration"
    );
    Ok(Configuration { entries })
}

fn check_overrides(registry: &OptionRegistry, overrides: &Overrides) -> Result<(), ConfigError> {
    let unknown: Vec<String> = overrides
        .keys()
        .filter(|name| !registry.contains(name))
        .cloned()
        .collect();
    if unknown.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::UnknownOption(unknown))
    }
}
