//! # Chambers
//!
//! A [`Chamber`] is a named bag of [`OverrideableRule`]s and the unit that
//! moves through storage. Its position in the namespace comes from the
//! logical path it is stored under, never from in-memory links.
//!
//! [`ChamberEntry`] is a read-only view of a chamber bound to one consumer
//! version, which is what applications hold onto to look up toggles.

use std::collections::BTreeMap;

use semver::Version;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::overrides::OverrideableRule;
use crate::rule::Rule;
use crate::version;

/// A named collection of rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chamber {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rules: BTreeMap<String, OverrideableRule>,
}

impl Chamber {
    /// Creates an empty chamber.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: BTreeMap::new(),
        }
    }

    /// Adds or replaces a rule, returning the previous definition.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        rule: OverrideableRule,
    ) -> Option<OverrideableRule> {
        self.rules.insert(name.into(), rule)
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_rule(mut self, name: impl Into<String>, rule: OverrideableRule) -> Self {
        self.insert(name, rule);
        self
    }

    pub fn get(&self, name: &str) -> Option<&OverrideableRule> {
        self.rules.get(name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Copies every rule of `ancestor` that this chamber does not define.
    ///
    /// Rules are adopted whole; a rule this chamber already defines is
    /// never touched.
    pub fn inherit_with(&mut self, ancestor: &Chamber) {
        for (name, rule) in &ancestor.rules {
            if !self.rules.contains_key(name) {
                self.rules.insert(name.clone(), rule.clone());
            }
        }
    }
}

/// A chamber bound to a consumer version.
///
/// The version is validated once, up front, so lookups stay cheap.
#[derive(Debug, Clone)]
pub struct ChamberEntry {
    rules: BTreeMap<String, OverrideableRule>,
    version: Option<Version>,
}

impl ChamberEntry {
    /// Binds `chamber` to `version`; the empty string means "no version"
    /// and always resolves base values.
    pub fn new(chamber: Chamber, version: &str) -> Result<Self> {
        let version = if version.is_empty() {
            None
        } else {
            Some(version::parse_version(version)?)
        };
        Ok(Self {
            rules: chamber.rules,
            version,
        })
    }

    /// The rule named `key`, if the chamber defines it.
    pub fn get(&self, key: &str) -> Option<&OverrideableRule> {
        self.rules.get(key)
    }

    fn resolve(&self, key: &str) -> Result<(&OverrideableRule, &Rule)> {
        let rule = self.get(key).ok_or_else(|| Error::RuleNotFound {
            key: key.to_string(),
        })?;
        let value = match &self.version {
            Some(version) => rule.value_at(version),
            None => rule.rule(),
        };
        Ok((rule, value))
    }

    fn not_convertible(key: &str, rule: &OverrideableRule) -> Error {
        Error::CouldNotConvertRule {
            key: key.to_string(),
            rule_type: rule.rule_type().as_str().to_string(),
        }
    }

    pub fn string_value(&self, key: &str) -> Result<&str> {
        let (rule, value) = self.resolve(key)?;
        value.as_str().ok_or_else(|| Self::not_convertible(key, rule))
    }

    pub fn bool_value(&self, key: &str) -> Result<bool> {
        let (rule, value) = self.resolve(key)?;
        value.as_bool().ok_or_else(|| Self::not_convertible(key, rule))
    }

    pub fn number_value(&self, key: &str) -> Result<f64> {
        let (rule, value) = self.resolve(key)?;
        value.as_number().ok_or_else(|| Self::not_convertible(key, rule))
    }

    /// Decodes a custom rule into `T`.
    pub fn custom_value<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let (rule, value) = self.resolve(key)?;
        value
            .decode_custom()
            .map_err(|_| Self::not_convertible(key, rule))?
            .ok_or_else(|| Self::not_convertible(key, rule))
    }
}
