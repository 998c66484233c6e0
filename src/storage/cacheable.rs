//! # Write-Through Caching
//!
//! [`CacheableStorage`] pairs a low-latency `cache` with an authoritative
//! `source`. The cache may lag behind the source but is never ahead of it:
//!
//! - `get` serves from the cache when it can and otherwise reads the
//!   source, then fills the cache on a best-effort basis.
//! - `put` and `delete` go to the source first and only reach the cache
//!   when the source succeeded, so a failed write never leaks into the
//!   cache.
//! - `list` always reads the source, since the cache may not hold every
//!   key.
//!
//! A write-through `put` caches what the source serves for the key after
//! the write, so a merging source below the cache never leaves a raw leaf
//! document in it.
//!
//! Cache faults are logged and swallowed; source faults are returned. When a
//! write-through `put` fails on the cache side the old cached copy is
//! evicted so that later reads fall through to the source.
//!
//! Once the source has changed, the cache is brought in line with a token
//! of its own, so cancelling the caller cannot leave a stale copy behind.
//! Every write bumps a per-key generation; a fill or refresh whose read
//! started before a newer write is dropped instead of cached.
//!
//! In a stack with inheritance the cache belongs outside:
//! `CacheableStorage(cache, InheritableStorage(source))`.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, error, warn};

use super::{registry, Options, Storage, StorageEntry};
use crate::cancel::CancellationToken;
use crate::error::{Error, Result};
use crate::path::normalize;

/// Cache backend used when the options do not name one.
pub const DEFAULT_CACHE: &str = "memory";

/// Write-through cache over an authoritative source.
pub struct CacheableStorage {
    cache: Box<dyn Storage>,
    source: Box<dyn Storage>,
    /// Write count per normalized key, bumped by every source write.
    generations: Mutex<HashMap<String, u64>>,
}

impl CacheableStorage {
    pub fn new(cache: Box<dyn Storage>, source: Box<dyn Storage>) -> Self {
        Self {
            cache,
            source,
            generations: Mutex::new(HashMap::new()),
        }
    }

    /// Builds both halves from flat options.
    ///
    /// `source` names the source backend and is required; `cache` defaults
    /// to [`DEFAULT_CACHE`]. Both backends receive the same option map.
    pub fn from_options(options: &Options) -> Result<Self> {
        let source_name = match options.get("source") {
            Some(name) if !name.is_empty() => name.as_str(),
            _ => {
                return Err(Error::MissingOption {
                    option: "source".to_string(),
                })
            }
        };
        let cache_name = match options.get("cache") {
            Some(name) if !name.is_empty() => name.as_str(),
            _ => DEFAULT_CACHE,
        };

        let source = registry::create_cacheable_half(source_name, options)?;
        let cache = registry::create_cacheable_half(cache_name, options)?;
        Ok(Self::new(cache, source))
    }

    fn generations(&self) -> MutexGuard<'_, HashMap<String, u64>> {
        // counters stay consistent even if a holder panicked
        self.generations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn generation(&self, key: &str) -> u64 {
        self.generations()
            .get(&normalize(key))
            .copied()
            .unwrap_or(0)
    }

    /// Records a source write and returns the key's new generation.
    fn bump(&self, key: &str) -> u64 {
        let mut generations = self.generations();
        let generation = generations.entry(normalize(key)).or_insert(0);
        *generation += 1;
        *generation
    }

    /// Caches `entry` unless the key was written after `generation`.
    ///
    /// The generation lock is held across the cache write, so a writer
    /// that bumps afterwards always evicts or overwrites this copy.
    fn fill(&self, entry: StorageEntry, generation: u64) -> Result<()> {
        let generations = self.generations();
        let current = generations.get(&normalize(&entry.key)).copied().unwrap_or(0);
        if current != generation {
            debug!("dropping stale cache fill for {}", entry.key);
            return Ok(());
        }
        self.cache.put(&CancellationToken::new(), entry)
    }

    fn evict(&self, key: &str) {
        if let Err(e) = self.cache.delete(&CancellationToken::new(), key) {
            warn!("cache eviction failed for {}: {}", key, e);
        }
    }

    /// Brings the cache in line after the source accepted a write.
    fn refresh(&self, key: &str) {
        let generation = self.bump(key);
        let refreshed = self
            .source
            .get(&CancellationToken::new(), key)
            .and_then(|fresh| self.fill(fresh, generation));
        if let Err(e) = refreshed {
            warn!("cache write failed for {}: {}", key, e);
            self.evict(key);
        }
    }
}

impl Storage for CacheableStorage {
    fn get(&self, token: &CancellationToken, key: &str) -> Result<StorageEntry> {
        debug!("get operation: {}", key);
        token.check()?;

        match self.cache.get(token, key) {
            Ok(entry) => return Ok(entry),
            // cache layer is expected to have missing records
            Err(e) if e.is_not_found() => debug!("cache miss: {}", key),
            Err(e) => warn!("cache get failed for {}: {}", key, e),
        }

        let generation = self.generation(key);
        let entry = self.source.get(token, key).map_err(|e| {
            if !e.is_not_found() {
                error!("source get failed for {}: {}", key, e);
            }
            e
        })?;
        token.check()?;

        if let Err(e) = self.fill(entry.clone(), generation) {
            warn!("cache fill failed for {}: {}", key, e);
        }

        Ok(entry)
    }

    fn put(&self, token: &CancellationToken, entry: StorageEntry) -> Result<()> {
        debug!("put operation: {}", entry.key);
        token.check()?;

        let key = entry.key.clone();
        if let Err(e) = self.source.put(token, entry) {
            // a cancelled write may still have reached the source
            if e.is_cancelled() {
                self.bump(&key);
                self.evict(&key);
            }
            return Err(e);
        }

        // cache what the source serves for the key, which differs from the
        // written payload when the source merges on read
        self.refresh(&key);

        token.check()?;
        Ok(())
    }

    fn delete(&self, token: &CancellationToken, key: &str) -> Result<()> {
        debug!("delete operation: {}", key);
        token.check()?;

        let deleted = self.source.delete(token, key);
        if deleted.is_ok() || matches!(&deleted, Err(e) if e.is_cancelled()) {
            self.bump(key);
            self.evict(key);
        }
        deleted?;

        token.check()?;
        Ok(())
    }

    fn list(&self, token: &CancellationToken, prefix: &str) -> Result<Vec<String>> {
        debug!("list operation: {}", prefix);
        token.check()?;
        let names = self.source.list(token, prefix)?;
        token.check()?;
        Ok(names)
    }
}
