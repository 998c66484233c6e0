//! # Hierarchical Inheritance
//!
//! [`InheritableStorage`] decorates a source [`Storage`] so that reading a
//! chamber also yields every rule it inherits from the chambers of its
//! ancestor directories.
//!
//! ## Merge order
//!
//! For a leaf at `/a/b/leaf` the walk reads `/a/` and then `/a/b/`,
//! shallowest first. Each level keeps every rule it defines and gains the
//! rules accumulated so far that it lacks; the leaf is merged last the same
//! way. The result behaves like a prototype chain: the nearest definition
//! of a rule wins and rules are adopted whole, never merged field by field.
//!
//! Ancestor levels are optional. A level that is missing or cannot be
//! decoded contributes nothing. A missing leaf is a `NotFound` error; there
//! is no fallback to an ancestor.
//!
//! Only `get` is merge-aware. `put`, `delete` and `list` go straight to the
//! source and only ever touch the addressed path.

use log::debug;

use super::{Storage, StorageEntry};
use crate::cancel::CancellationToken;
use crate::chamber::Chamber;
use crate::error::{Error, Result};
use crate::path::{ancestor_directories, validate_path};

/// Storage decorator that resolves inherited rules on read.
pub struct InheritableStorage {
    source: Box<dyn Storage>,
}

impl InheritableStorage {
    pub fn new(source: Box<dyn Storage>) -> Self {
        Self { source }
    }

    /// Reads one ancestor level, treating anything but cancellation as
    /// "contributes nothing".
    fn ancestor(&self, token: &CancellationToken, key: &str) -> Result<Option<Chamber>> {
        let entry = match self.source.get(token, key) {
            Ok(entry) => entry,
            Err(Error::Cancelled) => return Err(Error::Cancelled),
            Err(e) => {
                debug!("skipping ancestor {}: {}", key, e);
                return Ok(None);
            }
        };

        match entry.to_chamber() {
            Ok(chamber) => Ok(Some(chamber)),
            Err(e) => {
                debug!("skipping unreadable ancestor {}: {}", key, e);
                Ok(None)
            }
        }
    }
}

impl Storage for InheritableStorage {
    fn get(&self, token: &CancellationToken, key: &str) -> Result<StorageEntry> {
        debug!("get operation: {}", key);
        validate_path(key)?;
        token.check()?;

        // the leaf must exist before its parents are consulted
        let mut leaf = self.source.get(token, key)?.to_chamber()?;

        let ancestors = ancestor_directories(key);
        if !ancestors.is_empty() {
            let mut inherited = Chamber::default();
            for dir in &ancestors {
                if let Some(mut level) = self.ancestor(token, dir)? {
                    level.inherit_with(&inherited);
                    inherited = level;
                }
            }
            leaf.inherit_with(&inherited);
        }

        token.check()?;
        StorageEntry::from_chamber(key, &leaf)
    }

    fn put(&self, token: &CancellationToken, entry: StorageEntry) -> Result<()> {
        debug!("put operation: {}", entry.key);
        validate_path(&entry.key)?;
        token.check()?;

        self.source.put(token, entry)?;
        token.check()
    }

    fn delete(&self, token: &CancellationToken, key: &str) -> Result<()> {
        debug!("delete operation: {}", key);
        validate_path(key)?;
        token.check()?;

        self.source.delete(token, key)?;
        token.check()
    }

    fn list(&self, token: &CancellationToken, prefix: &str) -> Result<Vec<String>> {
        debug!("list operation: {}", prefix);
        validate_path(prefix)?;
        token.check()?;

        let names = self.source.list(token, prefix)?;
        token.check()?;
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overrides::OverrideableRule;
    use crate::storage::memory::MemoryStorage;
    use crate::storage::ChamberStorage;
    use std::sync::Arc;

    fn token() -> CancellationToken {
        CancellationToken::new()
    }

    fn seeded(chambers: &[(&str, Chamber)]) -> (Arc<MemoryStorage>, InheritableStorage) {
        let source = Arc::new(MemoryStorage::new());
        for (key, chamber) in chambers {
            source.put_chamber(&token(), key, chamber).unwrap();
        }
        let storage = InheritableStorage::new(Box::new(Arc::clone(&source)));
        (source, storage)
    }

    fn flag(value: bool) -> OverrideableRule {
        OverrideableRule::new(value)
    }

    fn bool_of(chamber: &Chamber, name: &str) -> Option<bool> {
        chamber.get(name).and_then(|r| r.rule().as_bool())
    }

    #[test]
    fn test_leaf_inherits_from_ancestors() {
        let (_, storage) = seeded(&[
            ("/root/", Chamber::new("root").with_rule("ruleA", flag(false))),
            ("/root/middle/", Chamber::new("middle").with_rule("ruleB", flag(true))),
            ("/root/middle/leaf", Chamber::new("leaf")),
        ]);

        let merged = storage.get_chamber(&token(), "/root/middle/leaf").unwrap();
        assert_eq!(merged.name, "leaf");
        assert_eq!(merged.len(), 2);
        assert_eq!(bool_of(&merged, "ruleA"), Some(false));
        assert_eq!(bool_of(&merged, "ruleB"), Some(true));
    }

    #[test]
    fn test_leaf_definition_wins() {
        let (_, storage) = seeded(&[
            ("/root/", Chamber::new("root").with_rule("ruleA", flag(false))),
            ("/root/middle/", Chamber::new("middle").with_rule("ruleB", flag(true))),
            (
                "/root/middle/leaf",
                Chamber::new("leaf").with_rule("ruleA", flag(true)),
            ),
        ]);

        let merged = storage.get_chamber(&token(), "/root/middle/leaf").unwrap();
        assert_eq!(bool_of(&merged, "ruleA"), Some(true));
        assert_eq!(bool_of(&merged, "ruleB"), Some(true));
    }

    #[test]
    fn test_closer_ancestor_shadows_farther() {
        let (_, storage) = seeded(&[
            ("/a/", Chamber::new("a").with_rule("rule", flag(false))),
            ("/a/b/", Chamber::new("b").with_rule("rule", flag(true))),
            ("/a/b/c", Chamber::new("c")),
        ]);

        let merged = storage.get_chamber(&token(), "/a/b/c").unwrap();
        assert_eq!(bool_of(&merged, "rule"), Some(true));
    }

    #[test]
    fn test_missing_ancestor_levels_are_skipped() {
        let (source, storage) = seeded(&[
            ("/a/", Chamber::new("a").with_rule("top", flag(true))),
            ("/a/b/c/d", Chamber::new("d")),
        ]);
        source
            .put(&token(), StorageEntry::new("/a/b/c/", b"garbage".to_vec()))
            .unwrap();

        let merged = storage.get_chamber(&token(), "/a/b/c/d").unwrap();
        assert_eq!(bool_of(&merged, "top"), Some(true));
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn test_missing_leaf_is_not_found() {
        let (_, storage) = seeded(&[("/a/", Chamber::new("a").with_rule("top", flag(true)))]);
        let err = storage.get(&token(), "/a/missing").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_child_of_root_is_returned_unmodified() {
        let leaf = Chamber::new("leaf").with_rule("only", flag(true));
        let (_, storage) = seeded(&[("/leaf", leaf.clone())]);
        assert_eq!(storage.get_chamber(&token(), "/leaf").unwrap(), leaf);
    }

    #[test]
    fn test_put_and_delete_touch_only_addressed_path() {
        let parent = Chamber::new("a").with_rule("top", flag(true));
        let (source, storage) = seeded(&[("/a/", parent.clone())]);

        storage
            .put_chamber(&token(), "/a/b", &Chamber::new("b"))
            .unwrap();
        assert_eq!(source.get_chamber(&token(), "/a/").unwrap(), parent);
        // the stored leaf holds only its own rules
        assert!(source.get_chamber(&token(), "/a/b").unwrap().is_empty());

        storage.delete(&token(), "/a/b").unwrap();
        assert!(source.get(&token(), "/a/b").unwrap_err().is_not_found());
        assert_eq!(source.get_chamber(&token(), "/a/").unwrap(), parent);
    }

    #[test]
    fn test_list_should_forward_to_source() {
        let (source, storage) = seeded(&[
            ("/a/", Chamber::new("a")),
            ("/a/b", Chamber::new("b")),
            ("/a/c/d", Chamber::new("d")),
        ]);
        assert_eq!(
            storage.list(&token(), "/a/").unwrap(),
            source.list(&token(), "/a/").unwrap()
        );
    }

    #[test]
    fn test_rejects_traversal() {
        let (_, storage) = seeded(&[]);
        assert!(matches!(
            storage.get(&token(), "a/../b"),
            Err(Error::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_cancelled_before_read() {
        let (_, storage) = seeded(&[("/a", Chamber::new("a"))]);
        let cancelled = CancellationToken::new();
        cancelled.cancel();
        assert!(storage.get(&cancelled, "/a").unwrap_err().is_cancelled());
    }
}
