//! # Storage
//!
//! This module defines the [`Storage`] capability set every backend and
//! decorator implements, along with the byte-level [`StorageEntry`] that
//! moves through it.
//!
//! ## Design
//!
//! Lower layers store opaque bytes keyed by logical path and never look at
//! rule semantics. Layers that need chambers decode the entry themselves,
//! usually through the [`ChamberStorage`] extension trait.
//!
//! Decorators are composed explicitly: each one owns the `Box<dyn Storage>`
//! it wraps and exposes the same four operations, so callers never need to
//! know how a stack was built.
//!
//! - [`memory::MemoryStorage`]: in-process map with an optional entry
//!   lifetime, the usual cache half of a cacheable stack.
//! - [`file::FileStorage`]: plain-file tree on local disk.
//! - [`inheritable::InheritableStorage`]: merges a chamber with its
//!   ancestors on read.
//! - [`cacheable::CacheableStorage`]: write-through cache over a source.
//!
//! ## Cancellation
//!
//! Every call takes a [`CancellationToken`]. Implementations check it when
//! they start and again after their I/O step.

pub mod builder;
pub mod cacheable;
pub mod file;
pub mod inheritable;
pub mod memory;
pub mod registry;

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use crate::cancel::CancellationToken;
use crate::chamber::Chamber;
use crate::error::{Error, Result};
use crate::path;

/// Flat string options a backend is constructed from.
pub type Options = HashMap<String, String>;

/// A stored payload and the logical path it lives under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEntry {
    pub key: String,
    pub value: Vec<u8>,
}

impl StorageEntry {
    pub fn new(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Encodes a chamber as its JSON document.
    pub fn from_chamber(key: impl Into<String>, chamber: &Chamber) -> Result<Self> {
        Ok(Self {
            key: key.into(),
            value: serde_json::to_vec(chamber)?,
        })
    }

    /// Decodes the payload as a chamber document.
    pub fn to_chamber(&self) -> Result<Chamber> {
        serde_json::from_slice(&self.value).map_err(|source| Error::InvalidChamber {
            key: self.key.clone(),
            source,
        })
    }
}

/// CRUD over byte entries keyed by logical path.
pub trait Storage: Send + Sync {
    /// Reads the entry at `key`, failing with [`Error::NotFound`] when
    /// nothing is stored there.
    fn get(&self, token: &CancellationToken, key: &str) -> Result<StorageEntry>;

    /// Creates or fully replaces the entry at `entry.key`.
    fn put(&self, token: &CancellationToken, entry: StorageEntry) -> Result<()>;

    /// Removes the entry at `key` without touching its siblings.
    fn delete(&self, token: &CancellationToken, key: &str) -> Result<()>;

    /// Lists the immediate children of `prefix`, sorted, with
    /// sub-directories suffixed by `/`.
    fn list(&self, token: &CancellationToken, prefix: &str) -> Result<Vec<String>>;
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn get(&self, token: &CancellationToken, key: &str) -> Result<StorageEntry> {
        (**self).get(token, key)
    }

    fn put(&self, token: &CancellationToken, entry: StorageEntry) -> Result<()> {
        (**self).put(token, entry)
    }

    fn delete(&self, token: &CancellationToken, key: &str) -> Result<()> {
        (**self).delete(token, key)
    }

    fn list(&self, token: &CancellationToken, prefix: &str) -> Result<Vec<String>> {
        (**self).list(token, prefix)
    }
}

impl<S: Storage + ?Sized> Storage for Arc<S> {
    fn get(&self, token: &CancellationToken, key: &str) -> Result<StorageEntry> {
        (**self).get(token, key)
    }

    fn put(&self, token: &CancellationToken, entry: StorageEntry) -> Result<()> {
        (**self).put(token, entry)
    }

    fn delete(&self, token: &CancellationToken, key: &str) -> Result<()> {
        (**self).delete(token, key)
    }

    fn list(&self, token: &CancellationToken, prefix: &str) -> Result<Vec<String>> {
        (**self).list(token, prefix)
    }
}

/// Chamber-level access on top of any [`Storage`].
pub trait ChamberStorage {
    fn get_chamber(&self, token: &CancellationToken, key: &str) -> Result<Chamber>;
    fn put_chamber(&self, token: &CancellationToken, key: &str, chamber: &Chamber) -> Result<()>;
}

impl<S: Storage + ?Sized> ChamberStorage for S {
    fn get_chamber(&self, token: &CancellationToken, key: &str) -> Result<Chamber> {
        self.get(token, key)?.to_chamber()
    }

    fn put_chamber(&self, token: &CancellationToken, key: &str, chamber: &Chamber) -> Result<()> {
        self.put(token, StorageEntry::from_chamber(key, chamber)?)
    }
}

/// Collects the immediate children of `prefix` out of a set of stored keys.
///
/// Keys must already be normalized. Leaves are reported by name and
/// anything deeper collapses into its first segment with a trailing `/`.
pub(crate) fn immediate_children<'a>(
    keys: impl IntoIterator<Item = &'a str>,
    prefix: &str,
) -> Vec<String> {
    let dir = path::normalize(prefix);
    let base = if dir == "/" { dir } else { format!("{}/", dir) };

    let mut names = BTreeSet::new();
    for key in keys {
        let Some(rest) = key.strip_prefix(base.as_str()) else {
            continue;
        };
        if rest.is_empty() {
            continue;
        }
        match rest.split_once('/') {
            Some((child, _)) => names.insert(format!("{}/", child)),
            None => names.insert(rest.to_string()),
        };
    }
    names.into_iter().collect()
}

/// Reads an optional duration option such as `90s`, `2m` or `1h`.
///
/// A bare number is taken as seconds.
pub(crate) fn duration_option(options: &Options, name: &str) -> Result<Option<Duration>> {
    let Some(raw) = options.get(name) else {
        return Ok(None);
    };
    let raw = raw.trim().to_lowercase();
    if raw.is_empty() {
        return Ok(None);
    }

    let invalid = |message: String| Error::InvalidOption {
        option: name.to_string(),
        message,
    };

    let split_idx = raw
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit() && *c != '.')
        .map_or(raw.len(), |(i, _)| i);
    if split_idx == 0 {
        return Err(invalid(format!("{:?} must start with a number", raw)));
    }

    let number: f64 = raw[..split_idx]
        .parse()
        .map_err(|_| invalid(format!("invalid number in {:?}", raw)))?;

    let seconds = match &raw[split_idx..] {
        "" | "s" | "sec" | "second" | "seconds" => number,
        "ms" => number / 1000.0,
        "m" | "min" | "minute" | "minutes" => number * 60.0,
        "h" | "hr" | "hour" | "hours" => number * 3600.0,
        "d" | "day" | "days" => number * 86400.0,
        unit => {
            return Err(invalid(format!(
                "invalid duration unit {:?}, valid units: ms, s, m, h, d",
                unit
            )))
        }
    };

    Duration::try_from_secs_f64(seconds)
        .map(Some)
        .map_err(|e| invalid(format!("{:?} is out of range: {}", raw, e)))
}
