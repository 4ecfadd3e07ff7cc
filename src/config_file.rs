//! File-backed option defaults
//!
//! A [`ConfigFile`] stands in for a default that lives in a YAML document. Loading it
//! yields a [`ResolvedConfig`]: the document (or the slice for the requested environment)
//! plus a weak reference back to the descriptor, which is what makes
//! [`ResolvedConfig::alternate`] possible.
//!
//! The descriptor remembers the last file it read. Alternate lookups re-read that file,
//! so an alternate-file override keeps working for `alternate`, while a raw mapping
//! override clears it and disables alternate lookups until the next file read.

use crate::error::ConfigError;
use crate::value::OptionValue;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_yaml::Value;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use tracing::{debug, warn};

/// Options for declaring a file-backed default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOptions {
    /// Select a top-level environment key from the document.
    pub environment_based: bool,
    /// Top-level keys that must be present after environment selection.
    pub keys: Vec<String>,
}

impl Default for FileOptions {
    fn default() -> Self {
        Self {
            environment_based: true,
            keys: Vec::new(),
        }
    }
}

impl FileOptions {
    pub fn environment_based(mut self, environment_based: bool) -> Self {
        self.environment_based = environment_based;
        self
    }

    pub fn keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keys = keys.into_iter().map(Into::into).collect();
        self
    }
}

/// A default value loaded from a configuration file.
#[derive(Debug)]
pub struct ConfigFile {
    path: PathBuf,
    environment_based: bool,
    keys: Vec<String>,
    last_loaded: Mutex<Option<PathBuf>>,
}

impl ConfigFile {
    pub fn new(path: impl Into<PathBuf>, options: FileOptions) -> Self {
        Self {
            path: path.into(),
            environment_based: options.environment_based,
            keys: options.keys,
            last_loaded: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_environment_based(&self) -> bool {
        self.environment_based
    }

    pub fn required_keys(&self) -> &[String] {
        &self.keys
    }

    /// The file most recently read through this descriptor, if alternate lookups are live.
    pub fn last_loaded_path(&self) -> Option<PathBuf> {
        self.last_loaded.lock().clone()
    }

    /// Load `environment` from the default file.
    ///
    /// The environment is ignored when the file is not environment-based.
    pub fn load(self: &Arc<Self>, environment: &str) -> Result<ResolvedConfig, ConfigError> {
        self.load_from_file(&self.path, environment)
    }

    /// Apply an override to this option.
    ///
    /// - `null`/`false` clears the option (`Ok(None)`).
    /// - A mapping is returned as-is, detached from any file.
    /// - A string naming an existing regular file loads `global_environment` from that file.
    /// - Any other string is an environment name to load from the default file.
    ///
    /// Rejected overrides name this descriptor's path; [`crate::resolve`] reports the
    /// option name instead.
    pub fn load_from_alternate(
        self: &Arc<Self>,
        global_environment: &str,
        alternate: &OptionValue,
    ) -> Result<Option<ResolvedConfig>, ConfigError> {
        if alternate.is_cleared() {
            debug!(path = %self.path.display(), "File-backed option cleared by override");
            return Ok(None);
        }

        match alternate {
            OptionValue::Data(Value::Mapping(map)) => {
                *self.last_loaded.lock() = None;
                warn!(
                    path = %self.path.display(),
                    "File-backed option overridden with a mapping; alternate lookups disabled"
                );
                Ok(Some(ResolvedConfig {
                    data: Value::Mapping(map.clone()),
                    source: Arc::downgrade(self),
                    detached: true,
                }))
            }
            OptionValue::Data(Value::String(name)) => {
                let candidate = Path::new(name);
                if candidate.is_file() {
                    debug!(file = %candidate.display(), "Loading option from alternate file");
                    self.load_from_file(candidate, global_environment).map(Some)
                } else {
                    debug!(environment = %name, "Loading option from alternate environment");
                    self.load_from_file(&self.path, name).map(Some)
                }
            }
            OptionValue::Data(other) => Err(ConfigError::InvalidOverride {
                option: self.path.display().to_string(),
                reason: format!(
                    "expected a filename, environment name or mapping, got {}",
                    describe(other)
                ),
            }),
            OptionValue::Handle(_) => Err(ConfigError::InvalidOverride {
                option: self.path.display().to_string(),
                reason: "handles cannot replace a file-backed option".to_string(),
            }),
        }
    }

    /// Re-read the most recently loaded file, selecting `environment`.
    pub fn alternate_config(
        self: &Arc<Self>,
        environment: &str,
    ) -> Result<ResolvedConfig, ConfigError> {
        let loaded_from = self.last_loaded_path();
        match loaded_from {
            Some(path) if self.environment_based => self.load_from_file(&path, environment),
            _ => Err(ConfigError::NotEnvironmentBased),
        }
    }

    fn load_from_file(
        self: &Arc<Self>,
        filename: &Path,
        environment: &str,
    ) -> Result<ResolvedConfig, ConfigError> {
        if !filename.exists() {
            return Err(ConfigError::FileNotFound(filename.to_path_buf()));
        }

        *self.last_loaded.lock() = Some(filename.to_path_buf());

        let content = std::fs::read_to_string(filename).map_err(|source| ConfigError::Io {
            path: filename.to_path_buf(),
            source,
        })?;
        let document: Value =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: filename.to_path_buf(),
                source,
            })?;

        let data = if self.environment_based {
            select_environment(document, environment, filename)?
        } else {
            document
        };

        for key in &self.keys {
            let present = data
                .as_mapping()
                .map(|map| map.contains_key(key.as_str()))
                .unwrap_or(false);
            if !present {
                return Err(ConfigError::MissingKey {
                    key: key.clone(),
                    path: filename.to_path_buf(),
                });
            }
        }

        debug!(
            file = %filename.display(),
            environment = %environment,
            environment_based = self.environment_based,
            "Loaded configuration file"
        );

        Ok(ResolvedConfig {
            data,
            source: Arc::downgrade(self),
            detached: false,
        })
    }
}

impl PartialEq for ConfigFile {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
            && self.environment_based == other.environment_based
            && self.keys == other.keys
    }
}

fn select_environment(
    document: Value,
    environment: &str,
    filename: &Path,
) -> Result<Value, ConfigError> {
    let not_found = || ConfigError::EnvironmentNotFound {
        environment: environment.to_string(),
        path: filename.to_path_buf(),
    };

    match document {
        Value::Mapping(environments) => match environments.get(environment) {
            Some(Value::Null | Value::Bool(false)) | None => Err(not_found()),
            Some(selected) => Ok(selected.clone()),
        },
        Value::Null => Err(not_found()),
        other => Err(ConfigError::InvalidDocument {
            path: filename.to_path_buf(),
            reason: format!(
                "environment-based file must be a mapping, found {}",
                describe(&other)
            ),
        }),
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Data loaded for a file-backed option.
///
/// Derefs to the loaded [`serde_yaml::Value`]. The back-reference to the producing
/// [`ConfigFile`] is weak; the registry owns the descriptor.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    data: Value,
    source: Weak<ConfigFile>,
    detached: bool,
}

impl ResolvedConfig {
    /// Load another environment from the file this value came from.
    pub fn alternate(&self, environment: &str) -> Result<ResolvedConfig, ConfigError> {
        if self.detached {
            return Err(ConfigError::NotEnvironmentBased);
        }
        let source = self.source.upgrade().ok_or(ConfigError::NotEnvironmentBased)?;
        source.alternate_config(environment)
    }

    /// True for values supplied as a raw mapping override.
    pub fn is_detached(&self) -> bool {
        self.detached
    }

    /// Default path of the descriptor that produced this value.
    pub fn source_path(&self) -> Option<PathBuf> {
        self.source.upgrade().map(|file| file.path.clone())
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn into_data(self) -> Value {
        self.data
    }

    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, serde_yaml::Error> {
        serde_yaml::from_value(self.data.clone())
    }
}

impl Deref for ResolvedConfig {
    type Target = Value;

    fn deref(&self) -> &Value {
        &self.data
    }
}

impl PartialEq<Value> for ResolvedConfig {
    fn eq(&self, other: &Value) -> bool {
        &self.data == other
    }
}
