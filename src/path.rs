//! Logical path handling for chamber keys
//!
//! Logical paths are POSIX-style, forward-slash separated strings such as
//! `/teams/search/ranking`. A trailing slash marks a directory (listing)
//! scope. A directory's own chamber is stored under the directory's key,
//! so `/teams/` and `/teams` name the same chamber while its children live
//! below it.

use crate::error::{Error, Result};

/// Rejects paths that could escape the namespace.
///
/// Any `..` segment fails validation, as does a NUL byte.
pub fn validate_path(path: &str) -> Result<()> {
    if path.split('/').any(|segment| segment == "..") {
        return Err(Error::InvalidPath {
            path: path.to_string(),
            message: "path cannot reference parents".to_string(),
        });
    }
    if path.contains('\0') {
        return Err(Error::InvalidPath {
            path: path.to_string(),
            message: "path cannot contain NUL bytes".to_string(),
        });
    }
    Ok(())
}

/// Returns the canonical storage key for a logical path.
///
/// The result always starts with `/`, has no empty or `.` segments and no
/// trailing slash, except for the root which is `/`.
pub fn normalize(path: &str) -> String {
    let segments = segments(path);
    if segments.is_empty() {
        return "/".to_string();
    }
    let mut key = String::with_capacity(path.len() + 1);
    for segment in segments {
        key.push('/');
        key.push_str(segment);
    }
    key
}

/// Splits a path into its non-empty, non-`.` segments.
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect()
}

/// Whether the path denotes a directory scope.
pub fn is_directory(path: &str) -> bool {
    path.is_empty() || path.ends_with('/')
}

/// The last segment of a path, or `""` for the root.
pub fn name(path: &str) -> &str {
    segments(path).last().copied().unwrap_or("")
}

/// The normalized parent of a path; the root is its own parent.
pub fn parent(path: &str) -> String {
    let segments = segments(path);
    match segments.split_last() {
        Some((_, rest)) if !rest.is_empty() => format!("/{}", rest.join("/")),
        _ => "/".to_string(),
    }
}

/// Directory keys from the shallowest ancestor down to the immediate
/// parent of `path`, excluding the root.
///
/// `/a/b/c` yields `["/a/", "/a/b/"]`; a child of the root yields nothing.
pub fn ancestor_directories(path: &str) -> Vec<String> {
    let segments = segments(path);
    let mut ancestors = Vec::new();
    let mut current = String::from("/");
    if let Some((_, dirs)) = segments.split_last() {
        for segment in dirs {
            current.push_str(segment);
            current.push('/');
            ancestors.push(current.clone());
        }
    }
    ancestors
}

/// Appends a `/` to a non-empty string that lacks one.
pub fn ensure_trailing_slash(s: &str) -> String {
    let s = s.trim();
    if s.is_empty() || s.ends_with('/') {
        return s.to_string();
    }
    format!("{}/", s)
}
