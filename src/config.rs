//! # Store Configuration
//!
//! A [`StoreConfig`] names the backend to build, the flat options handed to
//! it and whether reads resolve inherited rules. It is loaded from YAML,
//! JSON or TOML, picked by file extension:
//!
//! ```yaml
//! storage: cacheable
//! inheritable: true
//! options:
//!   source: file
//!   cache: memory
//!   path: /var/lib/realm
//!   life_window: 2m
//! ```
//!
//! [`StoreConfig::build`] turns it into a storage stack. Configuration is
//! always passed explicitly; nothing here is global.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Deserializer, Serialize};

use crate::defaults::{default_data_root, DEFAULT_STORAGE};
use crate::error::{Error, Result};
use crate::storage::builder::StorageBuilder;
use crate::storage::cacheable::DEFAULT_CACHE;
use crate::storage::{registry, Options, Storage};

/// How to build a storage stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Registered backend name: `file`, `memory` or `cacheable`.
    #[serde(default = "default_storage")]
    pub storage: String,

    /// Flat options handed to the backend constructors.
    #[serde(default, deserialize_with = "scalar_map")]
    pub options: Options,

    /// Merge each chamber with its ancestors on read.
    #[serde(default)]
    pub inheritable: bool,

    /// Log level the command-line front end starts with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

fn default_storage() -> String {
    DEFAULT_STORAGE.to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        let mut options = Options::new();
        options.insert(
            "path".to_string(),
            default_data_root().to_string_lossy().into_owned(),
        );
        Self {
            storage: default_storage(),
            options,
            inheritable: true,
            log_level: None,
        }
    }
}

/// Configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
    Toml,
}

impl Format {
    /// Picks a format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "yaml" | "yml" => Ok(Format::Yaml),
            "json" => Ok(Format::Json),
            "toml" => Ok(Format::Toml),
            _ => Err(Error::ConfigParse {
                message: format!("unrecognized configuration file {}", path.display()),
                hint: Some("use a .yaml, .yml, .json or .toml extension".to_string()),
            }),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Yaml => "yaml",
            Format::Json => "json",
            Format::Toml => "toml",
        };
        f.write_str(name)
    }
}

impl StoreConfig {
    /// Loads a configuration file, choosing the parser by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = Format::from_path(path)?;
        debug!("loading {} configuration from {}", format, path.display());
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, format)
    }

    /// Parses configuration text in the given format.
    pub fn parse(content: &str, format: Format) -> Result<Self> {
        let config: Self = match format {
            Format::Yaml => serde_yaml::from_str(content)?,
            Format::Json => serde_json::from_str(content)?,
            Format::Toml => toml::from_str(content)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the parts of the configuration that can be checked without
    /// touching a backend.
    pub fn validate(&self) -> Result<()> {
        if registry::lookup(&self.storage).is_none() {
            return Err(Error::ConfigParse {
                message: format!("unknown storage type {:?}", self.storage),
                hint: Some(format!(
                    "valid storage types: {}",
                    registry::storage_types().join(", ")
                )),
            });
        }
        if self.storage == "cacheable" && self.option("source").is_none() {
            return Err(Error::ConfigParse {
                message: "cacheable storage needs a source backend".to_string(),
                hint: Some("set options.source to file or memory".to_string()),
            });
        }
        Ok(())
    }

    /// A non-empty option value.
    pub fn option(&self, name: &str) -> Option<&str> {
        self.options
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Builds the storage stack: source, then inheritance, then cache.
    pub fn build(&self) -> Result<Box<dyn Storage>> {
        debug!(
            "building {} storage (inheritable={})",
            self.storage, self.inheritable
        );

        if self.storage != "cacheable" {
            let source = registry::create(&self.storage, &self.options)?;
            return Ok(StorageBuilder::new(source)
                .inheritable(self.inheritable)
                .build());
        }

        let source_name = self.option("source").ok_or_else(|| Error::MissingOption {
            option: "source".to_string(),
        })?;
        let cache_name = self.option("cache").unwrap_or(DEFAULT_CACHE);

        let source = registry::create_cacheable_half(source_name, &self.options)?;
        let cache = registry::create_cacheable_half(cache_name, &self.options)?;
        Ok(StorageBuilder::new(source)
            .inheritable(self.inheritable)
            .cache(cache)
            .build())
    }
}

/// Accepts option values written as strings, numbers or booleans.
fn scalar_map<'de, D>(deserializer: D) -> std::result::Result<Options, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Bool(bool),
        Int(i64),
        Float(f64),
        Text(String),
    }

    let raw: HashMap<String, Scalar> = HashMap::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                Scalar::Bool(b) => b.to_string(),
                Scalar::Int(i) => i.to_string(),
                Scalar::Float(f) => f.to_string(),
                Scalar::Text(s) => s,
            };
            (key, value)
        })
        .collect())
}
