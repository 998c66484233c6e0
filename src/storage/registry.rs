//! Backend registry
//!
//! Maps a backend name to the function that builds it from flat
//! [`Options`]. The cacheable backend is absent from the table used to
//! build the two halves of a cacheable stack, so stacks never nest.

use super::cacheable::CacheableStorage;
use super::file::FileStorage;
use super::memory::MemoryStorage;
use super::{Options, Storage};
use crate::error::{Error, Result};

/// Builds a backend from its options.
pub type StorageCreator = fn(&Options) -> Result<Box<dyn Storage>>;

fn create_file(options: &Options) -> Result<Box<dyn Storage>> {
    Ok(Box::new(FileStorage::from_options(options)?))
}

fn create_memory(options: &Options) -> Result<Box<dyn Storage>> {
    Ok(Box::new(MemoryStorage::from_options(options)?))
}

fn create_cacheable(options: &Options) -> Result<Box<dyn Storage>> {
    Ok(Box::new(CacheableStorage::from_options(options)?))
}

/// Every backend that can be named in configuration.
pub const STORAGE_OPTIONS: &[(&str, StorageCreator)] = &[
    ("cacheable", create_cacheable as StorageCreator),
    ("file", create_file as StorageCreator),
    ("memory", create_memory as StorageCreator),
];

/// Backends allowed as the cache or source half of a cacheable stack.
pub const CACHEABLE_STORAGE_OPTIONS: &[(&str, StorageCreator)] = &[
    ("file", create_file as StorageCreator),
    ("memory", create_memory as StorageCreator),
];

fn find(table: &[(&str, StorageCreator)], name: &str) -> Option<StorageCreator> {
    table
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, creator)| *creator)
}

/// Looks up the constructor registered under `name`.
pub fn lookup(name: &str) -> Option<StorageCreator> {
    find(STORAGE_OPTIONS, name)
}

/// Builds the backend registered under `name`.
pub fn create(name: &str, options: &Options) -> Result<Box<dyn Storage>> {
    let creator = lookup(name).ok_or_else(|| Error::UnknownStorageType {
        name: name.to_string(),
    })?;
    creator(options)
}

/// Builds one half of a cacheable stack.
pub(crate) fn create_cacheable_half(name: &str, options: &Options) -> Result<Box<dyn Storage>> {
    let creator =
        find(CACHEABLE_STORAGE_OPTIONS, name).ok_or_else(|| Error::UnknownStorageType {
            name: name.to_string(),
        })?;
    creator(options)
}

/// Names of every registered backend, sorted.
pub fn storage_types() -> Vec<&'static str> {
    STORAGE_OPTIONS.iter().map(|(name, _)| *name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancellationToken;
    use crate::storage::StorageEntry;

    #[test]
    fn test_storage_types() {
        assert_eq!(storage_types(), vec!["cacheable", "file", "memory"]);
        assert!(find(CACHEABLE_STORAGE_OPTIONS, "cacheable").is_none());
    }

    #[test]
    fn test_create_memory() {
        let storage = create("memory", &Options::new()).unwrap();
        let token = CancellationToken::new();
        storage
            .put(&token, StorageEntry::new("/k", b"v".to_vec()))
            .unwrap();
        assert_eq!(storage.get(&token, "/k").unwrap().value, b"v");
    }

    #[test]
    fn test_create_unknown() {
        assert!(lookup("redis").is_none());
        match create("redis", &Options::new()) {
            Err(Error::UnknownStorageType { name }) => assert_eq!(name, "redis"),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("redis should not be registered"),
        }
    }

    #[test]
    fn test_create_propagates_option_errors() {
        assert!(matches!(
            create("file", &Options::new()),
            Err(Error::MissingOption { .. })
        ));
    }
}
