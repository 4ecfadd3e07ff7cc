//! Option registry: the declared options of one component and their defaults.

use crate::config_file::{ConfigFile, FileOptions};
use crate::error::ConfigError;
use crate::resolver::{self, Configuration, Overrides};
use crate::value::OptionValue;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Default for a declared option.
#[derive(Debug, Clone)]
pub enum Descriptor {
    /// An in-memory default, copied into each resolved configuration.
    Literal(OptionValue),
    /// A default loaded from a file on every resolution.
    File(Arc<ConfigFile>),
}

impl Descriptor {
    pub fn as_literal(&self) -> Option<&OptionValue> {
        match self {
            Descriptor::Literal(value) => Some(value),
            Descriptor::File(_) => None,
        }
    }

    pub fn as_config_file(&self) -> Option<&Arc<ConfigFile>> {
        match self {
            Descriptor::File(file) => Some(file),
            Descriptor::Literal(_) => None,
        }
    }
}

impl PartialEq for Descriptor {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Descriptor::Literal(a), Descriptor::Literal(b)) => a == b,
            (Descriptor::File(a), Descriptor::File(b)) => a == b,
            _ => false,
        }
    }
}

/// Declared options for a component.
///
/// The host owns one registry per component and passes it to
/// [`OptionRegistry::load_configuration`]. Resolutions against the same registry are
/// serialized because file-backed descriptors carry per-descriptor load state.
#[derive(Debug, Default)]
pub struct OptionRegistry {
    options: BTreeMap<String, Descriptor>,
    resolution_lock: Mutex<()>,
}

impl OptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a block of declarations. May be called any number of times.
    pub fn configure<F>(&mut self, declare: F) -> &mut Self
    where
        F: FnOnce(&mut OptionRegistry),
    {
        declare(self);
        self
    }

    /// Register `name` with an in-memory default.
    pub fn option(
        &mut self,
        name: impl Into<String>,
        default: impl Into<OptionValue>,
    ) -> &Descriptor {
        self.declare(name, Descriptor::Literal(default.into()))
    }

    /// Register `name` with a default loaded from the file at `path`.
    pub fn config_file(
        &mut self,
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        options: FileOptions,
    ) -> &Descriptor {
        self.declare(name, Descriptor::File(Arc::new(ConfigFile::new(path, options))))
    }

    /// Store a descriptor, replacing any earlier declaration of the same name.
    pub fn declare(&mut self, name: impl Into<String>, descriptor: Descriptor) -> &Descriptor {
        let name = name.into();
        tracing::trace!(option = %name, "Declared option");
        self.options.insert(name.clone(), descriptor);
        &self.options[&name]
    }

    pub fn options(&self) -> &BTreeMap<String, Descriptor> {
        &self.options
    }

    pub fn get(&self, name: &str) -> Option<&Descriptor> {
        self.options.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Resolve the configuration for `environment`, applying `overrides`.
    ///
    /// Prefer this over calling [`resolver::resolve`] directly when the registry is shared
    /// between threads.
    pub fn load_configuration(
        &self,
        environment: &str,
        overrides: &Overrides,
    ) -> Result<Configuration, ConfigError> {
        let _guard = self.resolution_lock.lock();
        resolver::resolve(self, environment, overrides)
    }
}
