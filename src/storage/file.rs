//! Plain-file tree storage backend
//!
//! A chamber at `/a/b` is stored in `<root>/a/_b`. The `_` prefix keeps
//! leaf files apart from the directories that hold their children, so a
//! directory's own chamber (`/a`, stored as `<root>/_a`) can sit next to
//! the directory `<root>/a/`.

use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::PathBuf;

use log::debug;
use walkdir::WalkDir;

use super::{Options, Storage, StorageEntry};
use crate::cancel::CancellationToken;
use crate::error::{Error, Result};
use crate::path::{segments, validate_path};

/// Storage backed by a directory tree.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Builds a store from flat options; `path` is required.
    pub fn from_options(options: &Options) -> Result<Self> {
        match options.get("path") {
            Some(path) if !path.is_empty() => Ok(Self::new(path)),
            _ => Err(Error::MissingOption {
                option: "path".to_string(),
            }),
        }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf> {
        let segments = segments(key);
        let Some((leaf, dirs)) = segments.split_last() else {
            return Err(Error::InvalidPath {
                path: key.to_string(),
                message: "path must name a chamber".to_string(),
            });
        };

        let mut path = self.root.clone();
        path.extend(dirs);
        path.push(format!("_{}", leaf));
        Ok(path)
    }

    fn dir_path(&self, prefix: &str) -> PathBuf {
        let mut path = self.root.clone();
        path.extend(segments(prefix));
        path
    }
}

impl Storage for FileStorage {
    fn get(&self, token: &CancellationToken, key: &str) -> Result<StorageEntry> {
        debug!("get operation: {}", key);
        validate_path(key)?;
        let path = self.entry_path(key)?;
        token.check()?;

        let value = match fs::read(&path) {
            Ok(value) => value,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::NotFound {
                    key: key.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };

        token.check()?;
        Ok(StorageEntry::new(key, value))
    }

    fn put(&self, token: &CancellationToken, entry: StorageEntry) -> Result<()> {
        debug!("put operation: {}", entry.key);
        validate_path(&entry.key)?;
        let path = self.entry_path(&entry.key)?;
        token.check()?;

        let dir = path.parent().unwrap_or(self.root.as_path());
        fs::create_dir_all(dir)?;

        // stage beside the target and rename so readers never see a partial file
        let mut staged = tempfile::Builder::new()
            .prefix(".")
            .suffix(".tmp")
            .tempfile_in(dir)?;
        staged.write_all(&entry.value)?;
        staged.persist(&path).map_err(io::Error::from)?;

        token.check()?;
        Ok(())
    }

    fn delete(&self, token: &CancellationToken, key: &str) -> Result<()> {
        debug!("delete operation: {}", key);
        validate_path(key)?;
        let path = self.entry_path(key)?;
        token.check()?;

        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        token.check()?;
        Ok(())
    }

    fn list(&self, token: &CancellationToken, prefix: &str) -> Result<Vec<String>> {
        debug!("list operation: {}", prefix);
        validate_path(prefix)?;
        token.check()?;

        let dir = self.dir_path(prefix);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in WalkDir::new(&dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| Error::Io(e.into()))?;
            let name = entry.file_name().to_string_lossy();
            if name.starts_with('.') {
                continue;
            }
            if entry.file_type().is_dir() {
                names.push(format!("{}/", name));
            } else if let Some(leaf) = name.strip_prefix('_') {
                names.push(leaf.to_string());
            }
        }

        token.check()?;
        names.sort();
        Ok(names)
    }
}
