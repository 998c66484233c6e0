//! In-process storage backend
//!
//! Entries live in a `HashMap` behind an `RwLock`. With a life window set,
//! an entry older than the window reads as missing, which is what makes
//! this backend suitable as the cache half of a
//! [`CacheableStorage`](super::cacheable::CacheableStorage).
//!
//! Expired entries are dropped when a read finds them and by a sweep that
//! `put` runs at most once per life window.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use log::debug;

use super::{duration_option, immediate_children, Options, Storage, StorageEntry};
use crate::cancel::CancellationToken;
use crate::error::{Error, Result};
use crate::path::{normalize, validate_path};

/// Default time after which an entry expires.
pub const DEFAULT_LIFE_WINDOW: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
struct Slot {
    value: Vec<u8>,
    written: Instant,
}

/// In-memory storage with optional entry expiry.
#[derive(Debug)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, Slot>>,
    life_window: Option<Duration>,
    last_sweep: Mutex<Instant>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            life_window: None,
            last_sweep: Mutex::new(Instant::now()),
        }
    }
}

impl MemoryStorage {
    /// Creates a store whose entries never expire.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose entries expire after `life_window`.
    pub fn with_life_window(life_window: Duration) -> Self {
        Self {
            life_window: Some(life_window),
            ..Self::default()
        }
    }

    /// Builds a store from flat options.
    ///
    /// `life_window` defaults to [`DEFAULT_LIFE_WINDOW`]; `0` disables
    /// expiry.
    pub fn from_options(options: &Options) -> Result<Self> {
        let life_window = duration_option(options, "life_window")?.unwrap_or(DEFAULT_LIFE_WINDOW);
        if life_window.is_zero() {
            return Ok(Self::new());
        }
        Ok(Self::with_life_window(life_window))
    }

    /// Number of entries currently held, expired or not.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.is_empty())
    }

    /// Drops every expired entry.
    pub fn purge_expired(&self) -> Result<usize> {
        let mut entries = self.write()?;
        Ok(self.sweep(&mut entries))
    }

    fn sweep(&self, entries: &mut HashMap<String, Slot>) -> usize {
        let before = entries.len();
        entries.retain(|_, slot| !self.is_expired(slot));
        let purged = before - entries.len();
        if purged > 0 {
            debug!("purged {} expired entries", purged);
        }
        purged
    }

    /// Whether a full sweep is due, restarting the sweep clock when it is.
    fn sweep_due(&self) -> bool {
        let Some(window) = self.life_window else {
            return false;
        };
        // the guarded instant is always valid, so a poisoned lock is harmless
        let mut last = self.last_sweep.lock().unwrap_or_else(PoisonError::into_inner);
        if last.elapsed() < window {
            return false;
        }
        *last = Instant::now();
        true
    }

    fn is_expired(&self, slot: &Slot) -> bool {
        self.life_window
            .map_or(false, |window| slot.written.elapsed() >= window)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Slot>>> {
        self.entries.read().map_err(|_| Error::LockPoisoned {
            context: "memory storage".to_string(),
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Slot>>> {
        self.entries.write().map_err(|_| Error::LockPoisoned {
            context: "memory storage".to_string(),
        })
    }
}

impl Storage for MemoryStorage {
    fn get(&self, token: &CancellationToken, key: &str) -> Result<StorageEntry> {
        debug!("get operation: {}", key);
        validate_path(key)?;
        token.check()?;

        let normalized = normalize(key);

        let expired = match self.read()?.get(&normalized) {
            Some(slot) if !self.is_expired(slot) => {
                let value = slot.value.clone();
                token.check()?;
                return Ok(StorageEntry::new(key, value));
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            let mut entries = self.write()?;
            // a writer may have refreshed the slot while the lock was released
            if entries.get(&normalized).is_some_and(|slot| self.is_expired(slot)) {
                entries.remove(&normalized);
            }
        }

        token.check()?;
        Err(Error::NotFound {
            key: key.to_string(),
        })
    }

    fn put(&self, token: &CancellationToken, entry: StorageEntry) -> Result<()> {
        debug!("put operation: {}", entry.key);
        validate_path(&entry.key)?;
        token.check()?;

        {
            let mut entries = self.write()?;
            if self.sweep_due() {
                self.sweep(&mut entries);
            }
            entries.insert(
                normalize(&entry.key),
                Slot {
                    value: entry.value,
                    written: Instant::now(),
                },
            );
        }

        token.check()?;
        Ok(())
    }

    fn delete(&self, token: &CancellationToken, key: &str) -> Result<()> {
        debug!("delete operation: {}", key);
        validate_path(key)?;
        token.check()?;

        self.write()?.remove(&normalize(key));

        token.check()?;
        Ok(())
    }

    fn list(&self, token: &CancellationToken, prefix: &str) -> Result<Vec<String>> {
        debug!("list operation: {}", prefix);
        validate_path(prefix)?;
        token.check()?;

        let names = {
            let entries = self.read()?;
            let live = entries
                .iter()
                .filter(|(_, slot)| !self.is_expired(slot))
                .map(|(key, _)| key.as_str());
            immediate_children(live, prefix)
        };

        token.check()?;
        Ok(names)
    }
}
