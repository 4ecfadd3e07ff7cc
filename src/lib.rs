//! Configurable: declarative option defaults with environment-aware loading
//!
//! A component declares its options in an [`OptionRegistry`], some of them backed by
//! YAML files that may be keyed by environment. Callers then ask for the merged
//! [`Configuration`] of an environment, optionally overriding options with literal
//! values, alternate filenames, alternate environment names, or in-memory mappings.

pub mod config_file;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod registry;
pub mod resolver;
pub mod value;

pub use config_file::{ConfigFile, FileOptions, ResolvedConfig};
pub use error::ConfigError;
pub use manifest::{OptionEntry, OptionManifest};
pub use registry::{Descriptor, OptionRegistry};
pub use resolver::{resolve, Configuration, Overrides, Resolved};
pub use value::{Handle, OptionValue};
