//! # Semantic Versions
//!
//! Override ranges and consumer versions are semantic versions written with
//! or without a leading `v` (`v1.2.3` and `1.2.3` are the same version).
//! Parsing is delegated to the `semver` crate; ordering follows semantic
//! version precedence, so build metadata never affects a comparison and a
//! pre-release sorts before its release (`v1.0.2-pre.0 < v1.0.2`).
//!
//! [`SemVer`] keeps the literal it was parsed from so that chamber
//! documents round-trip without rewriting the author's spelling.

use std::cmp::Ordering;
use std::fmt;

use semver::Version;

use crate::error::{Error, Result};

/// A parsed semantic version together with its original spelling.
#[derive(Debug, Clone)]
pub struct SemVer {
    literal: String,
    version: Version,
}

impl SemVer {
    /// Parses a semantic version, accepting an optional `v` prefix.
    pub fn parse(literal: &str) -> Result<Self> {
        let version = parse_version(literal)?;
        Ok(Self {
            literal: literal.to_string(),
            version,
        })
    }

    /// Parses an override bound where the empty string means "unbounded".
    pub fn parse_bound(literal: &str) -> Result<Option<Self>> {
        if literal.is_empty() {
            return Ok(None);
        }
        Self::parse(literal).map(Some)
    }

    /// The literal this version was parsed from.
    pub fn as_str(&self) -> &str {
        &self.literal
    }

    /// The parsed version.
    pub fn version(&self) -> &Version {
        &self.version
    }
}

impl PartialEq for SemVer {
    fn eq(&self, other: &Self) -> bool {
        compare(&self.version, &other.version) == Ordering::Equal
    }
}

impl Eq for SemVer {}

impl PartialOrd for SemVer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SemVer {
    fn cmp(&self, other: &Self) -> Ordering {
        compare(&self.version, &other.version)
    }
}

impl fmt::Display for SemVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.literal)
    }
}

/// Parses a version string with an optional `v` prefix.
pub fn parse_version(literal: &str) -> Result<Version> {
    let trimmed = literal.strip_prefix('v').unwrap_or(literal);
    Version::parse(trimmed).map_err(|e| Error::InvalidVersion {
        version: literal.to_string(),
        message: e.to_string(),
    })
}

/// Compares two versions by semantic version precedence.
///
/// Build metadata is ignored; `semver`'s own `Ord` would order on it.
pub fn compare(a: &Version, b: &Version) -> Ordering {
    a.major
        .cmp(&b.major)
        .then(a.minor.cmp(&b.minor))
        .then(a.patch.cmp(&b.patch))
        .then_with(|| a.pre.cmp(&b.pre))
}
