//! Stack composition
//!
//! [`StorageBuilder`] assembles a source backend with the optional
//! decorators in the one order that keeps reads coherent: the cache sits
//! outside and inheritance inside, so cached payloads are already merged.

use log::debug;

use super::cacheable::CacheableStorage;
use super::inheritable::InheritableStorage;
use super::Storage;

/// Composes a storage stack around a source backend.
pub struct StorageBuilder {
    source: Box<dyn Storage>,
    inheritable: bool,
    cache: Option<Box<dyn Storage>>,
}

impl StorageBuilder {
    pub fn new(source: Box<dyn Storage>) -> Self {
        Self {
            source,
            inheritable: false,
            cache: None,
        }
    }

    /// Resolve inherited rules on read.
    pub fn inheritable(mut self, enabled: bool) -> Self {
        self.inheritable = enabled;
        self
    }

    /// Put a write-through cache in front of the stack.
    pub fn cache(mut self, cache: Box<dyn Storage>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn build(self) -> Box<dyn Storage> {
        debug!(
            "building storage stack: inheritable={}, cached={}",
            self.inheritable,
            self.cache.is_some()
        );

        let mut storage = self.source;
        if self.inheritable {
            storage = Box::new(InheritableStorage::new(storage));
        }
        if let Some(cache) = self.cache {
            storage = Box::new(CacheableStorage::new(cache, storage));
        }
        storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancellationToken;
    use crate::chamber::Chamber;
    use crate::overrides::OverrideableRule;
    use crate::storage::memory::MemoryStorage;
    use crate::storage::ChamberStorage;
    use std::sync::Arc;

    fn token() -> CancellationToken {
        CancellationToken::new()
    }

    #[test]
    fn test_plain_source() {
        let source = Arc::new(MemoryStorage::new());
        let storage = StorageBuilder::new(Box::new(Arc::clone(&source))).build();
        storage
            .put_chamber(&token(), "/a/", &Chamber::new("a").with_rule("x", OverrideableRule::new(1.0)))
            .unwrap();
        storage.put_chamber(&token(), "/a/b", &Chamber::new("b")).unwrap();

        assert!(storage.get_chamber(&token(), "/a/b").unwrap().is_empty());
    }

    #[test]
    fn test_cache_holds_merged_chambers() {
        let source = Arc::new(MemoryStorage::new());
        let cache = Arc::new(MemoryStorage::new());
        let storage = StorageBuilder::new(Box::new(Arc::clone(&source)))
            .inheritable(true)
            .cache(Box::new(Arc::clone(&cache)))
            .build();

        source
            .put_chamber(&token(), "/a/", &Chamber::new("a").with_rule("x", OverrideableRule::new(1.0)))
            .unwrap();
        source.put_chamber(&token(), "/a/b", &Chamber::new("b")).unwrap();

        let merged = storage.get_chamber(&token(), "/a/b").unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(cache.get_chamber(&token(), "/a/b").unwrap(), merged);
    }
}
