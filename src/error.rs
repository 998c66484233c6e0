//! # Error Handling
//!
//! This module defines the centralized error type for `realm`. It uses the
//! `thiserror` library to build a single `Error` enum that covers every
//! failure the rule model, the storage layers and the configuration loader
//! can produce.
//!
//! ## Categories
//!
//! - **Validation errors**: malformed semantic versions, empty or inverted
//!   override ranges, overlapping overrides, type/value mismatches,
//!   unsupported type tags, traversal in logical paths and missing or
//!   malformed configuration options. These are raised where the bad input
//!   is supplied and are never corrected silently.
//! - **Not-found errors**: `NotFound` carries the storage key so callers can
//!   decide to create on a miss (see [`Error::is_not_found`]).
//! - **Cancellation**: `Cancelled` is returned when a caller's
//!   [`CancellationToken`](crate::cancel::CancellationToken) fires.
//! - **Backend faults**: I/O, serialization and lock failures, propagated
//!   as-is.
//!
//! The `Result` alias is used throughout the library.

use thiserror::Error;

/// Main error type for realm operations
#[derive(Error, Debug)]
pub enum Error {
    /// A version string is not a valid semantic version.
    #[error("{version:?} is not a valid semantic version: {message}")]
    InvalidVersion { version: String, message: String },

    /// An override declared neither a minimum nor a maximum version.
    #[error("override must set a minimum version, a maximum version, or both")]
    EmptyOverrideRange,

    /// An override's minimum version is greater than its maximum version.
    #[error("an override with the minimum version of {minimum} is greater than its maximum version ({maximum})")]
    InvertedOverrideRange { minimum: String, maximum: String },

    /// Two consecutive overrides overlap or are out of order.
    #[error("an override with maximum version {previous_maximum:?} is semantically greater than the next override's minimum version ({next_minimum:?})")]
    OverlappingOverrides {
        previous_maximum: String,
        next_minimum: String,
    },

    /// A raw value does not decode into the declared rule type.
    #[error("{value} of the specified type {expected:?} is incompatible: {message}")]
    TypeMismatch {
        expected: String,
        value: String,
        message: String,
    },

    /// The rule type tag is not one of the supported types.
    #[error("type {tag:?} is currently not supported")]
    UnsupportedType { tag: String },

    /// A rule or override value was absent or null.
    #[error("value cannot be empty/null with type specified as: {tag:?}")]
    MissingValue { tag: String },

    /// A logical path failed validation before any I/O was attempted.
    #[error("invalid path {path:?}: {message}")]
    InvalidPath { path: String, message: String },

    /// A required storage option was not supplied.
    #[error("{option:?} must be set")]
    MissingOption { option: String },

    /// A storage option was supplied but could not be interpreted.
    #[error("failed to parse {option}: {message}")]
    InvalidOption { option: String, message: String },

    /// The storage type name is not present in the registry.
    #[error("storage type {name:?} does not exist")]
    UnknownStorageType { name: String },

    /// Nothing is stored at the given key.
    #[error("{key:?} does not exist")]
    NotFound { key: String },

    /// The caller's cancellation token fired during a storage call.
    #[error("operation cancelled")]
    Cancelled,

    /// A chamber does not define the requested rule.
    #[error("{key} does not exist")]
    RuleNotFound { key: String },

    /// A rule's resolved value is not of the requested type.
    #[error("{key:?} could not be converted: it is of type {rule_type:?}")]
    CouldNotConvertRule { key: String, rule_type: String },

    /// A stored payload could not be decoded into a chamber.
    #[error("could not decode chamber at {key:?}: {source}")]
    InvalidChamber {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The configuration file could not be read or interpreted.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// An error indicating that a lock has been poisoned.
    #[error("Lock poisoned: {context}")]
    LockPoisoned { context: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A TOML parsing error, wrapped from `toml::de::Error`.
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Returns true when the error reports a missing storage key.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Returns true when the error reports a fired cancellation token.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_not_found() {
        let error = Error::NotFound {
            key: "/teams/search".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("\"/teams/search\""));
        assert!(display.contains("does not exist"));
        assert!(error.is_not_found());
        assert!(!error.is_cancelled());
    }

    #[test]
    fn test_error_display_unsupported_type() {
        let error = Error::UnsupportedType {
            tag: "date".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "type \"date\" is currently not supported"
        );
    }

    #[test]
    fn test_error_display_overlapping_overrides() {
        let error = Error::OverlappingOverrides {
            previous_maximum: "v1.2.0".to_string(),
            next_minimum: "v1.1.0".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("v1.2.0"));
        assert!(display.contains("v1.1.0"));
    }

    #[test]
    fn test_error_display_config_parse_with_hint() {
        let error = Error::ConfigParse {
            message: "unknown extension".to_string(),
            hint: Some("use .yaml, .json or .toml".to_string()),
        };
        let display = format!("{}", error);
        assert!(display.contains("Configuration parsing error"));
        assert!(display.contains("hint:"));
        assert!(display.contains(".toml"));
    }

    #[test]
    fn test_error_cancelled() {
        let error = Error::Cancelled;
        assert!(error.is_cancelled());
        assert!(!error.is_not_found());
        assert_eq!(format!("{}", error), "operation cancelled");
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error: Error = io_error.into();
        let display = format!("{}", error);
        assert!(display.contains("I/O error"));
        assert!(display.contains("denied"));
    }

    #[test]
    fn test_error_from_yaml_error() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: [unclosed").unwrap_err();
        let error: Error = yaml_error.into();
        assert!(format!("{}", error).contains("YAML parsing error"));
    }
}
