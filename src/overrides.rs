//! # Version Overrides
//!
//! An [`Override`] replaces a rule's base value while the consumer's
//! declared version lies inside an inclusive semantic version range. An
//! [`OverrideableRule`] is a base [`Rule`] plus an ordered list of such
//! overrides.
//!
//! ## Invariants
//!
//! Both are validated when they are built, whether through the
//! constructors or by deserializing a chamber document:
//!
//! - an override bounds at least one side of its range; an empty bound is
//!   open on that side,
//! - an override's minimum never exceeds its maximum,
//! - an override carries a value of the same type as its rule,
//! - overrides are sorted and pairwise non-overlapping: for consecutive
//!   overrides `a` then `b`, `a.maximum <= b.minimum`.
//!
//! Because of the last invariant the first override containing a version
//! is the only one that can contain it, except on a shared boundary
//! (`a.maximum == b.minimum`) where the earlier override wins.
//!
//! ## Document shape
//!
//! ```json
//! {
//!   "type": "string",
//!   "value": "default",
//!   "overrides": [
//!     { "minimumVersion": "v1.0.0", "maximumVersion": "v1.0.1", "value": "A" }
//!   ]
//! }
//! ```

use std::cmp::Ordering;
use std::str::FromStr;

use log::debug;
use semver::Version;
use serde::de::DeserializeOwned;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::value::RawValue;

use crate::error::{Error, Result};
use crate::rule::{Rule, RuleType};
use crate::version::{self, SemVer};

/// A rule value restricted to an inclusive semantic version range.
#[derive(Debug, Clone, PartialEq)]
pub struct Override {
    minimum: Option<SemVer>,
    maximum: Option<SemVer>,
    value: Rule,
}

impl Override {
    /// Creates an override for `[minimum, maximum]`; an empty bound is open.
    pub fn new(minimum: &str, maximum: &str, value: impl Into<Rule>) -> Result<Self> {
        let minimum = SemVer::parse_bound(minimum)?;
        let maximum = SemVer::parse_bound(maximum)?;

        match (&minimum, &maximum) {
            (None, None) => return Err(Error::EmptyOverrideRange),
            (Some(min), Some(max)) if min > max => {
                return Err(Error::InvertedOverrideRange {
                    minimum: min.to_string(),
                    maximum: max.to_string(),
                })
            }
            _ => {}
        }

        Ok(Self {
            minimum,
            maximum,
            value: value.into(),
        })
    }

    /// The minimum version as written, or `""` when open below.
    pub fn minimum_version(&self) -> &str {
        self.minimum.as_ref().map_or("", SemVer::as_str)
    }

    /// The maximum version as written, or `""` when open above.
    pub fn maximum_version(&self) -> &str {
        self.maximum.as_ref().map_or("", SemVer::as_str)
    }

    pub fn value(&self) -> &Rule {
        &self.value
    }

    /// Whether `version` lies inside this override's range.
    pub fn contains(&self, version: &Version) -> bool {
        let above_minimum = self
            .minimum
            .as_ref()
            .map_or(true, |min| version::compare(min.version(), version) != Ordering::Greater);
        let below_maximum = self
            .maximum
            .as_ref()
            .map_or(true, |max| version::compare(max.version(), version) != Ordering::Less);
        above_minimum && below_maximum
    }
}

/// A rule plus its version overrides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RuleDocument")]
pub struct OverrideableRule {
    rule: Rule,
    overrides: Vec<Override>,
}

impl OverrideableRule {
    /// A rule without overrides.
    pub fn new(rule: impl Into<Rule>) -> Self {
        Self {
            rule: rule.into(),
            overrides: Vec::new(),
        }
    }

    /// A rule with overrides, validating type agreement and ordering.
    pub fn with_overrides(rule: impl Into<Rule>, overrides: Vec<Override>) -> Result<Self> {
        let rule = rule.into();
        let rule_type = rule.rule_type();

        for o in &overrides {
            if o.value.rule_type() != rule_type {
                return Err(Error::TypeMismatch {
                    expected: rule_type.as_str().to_string(),
                    value: serde_json::to_string(&o.value)?,
                    message: format!(
                        "override value is of type {:?}",
                        o.value.rule_type().as_str()
                    ),
                });
            }
        }

        for pair in overrides.windows(2) {
            check_non_overlapping(&pair[0], &pair[1])?;
        }

        Ok(Self { rule, overrides })
    }

    /// The base value.
    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn rule_type(&self) -> RuleType {
        self.rule.rule_type()
    }

    pub fn overrides(&self) -> &[Override] {
        &self.overrides
    }

    /// Resolves the value for a consumer version.
    ///
    /// The empty string, and any string that is not a valid semantic
    /// version, resolve to the base value.
    pub fn value_at_version(&self, version: &str) -> &Rule {
        if version.is_empty() || self.overrides.is_empty() {
            return &self.rule;
        }

        match version::parse_version(version) {
            Ok(parsed) => self.value_at(&parsed),
            Err(e) => {
                debug!("resolving base value for unparseable version: {}", e);
                &self.rule
            }
        }
    }

    /// Resolves the value for an already parsed consumer version.
    pub fn value_at(&self, version: &Version) -> &Rule {
        self.overrides
            .iter()
            .find(|o| o.contains(version))
            .map_or(&self.rule, |o| &o.value)
    }

    /// The string value at `version`, or `default` and `false` when the
    /// resolved value is not a string.
    pub fn string_value<'a>(&'a self, version: &str, default: &'a str) -> (&'a str, bool) {
        match self.value_at_version(version).as_str() {
            Some(s) => (s, true),
            None => (default, false),
        }
    }

    /// The boolean value at `version`, or `default` and `false` on a type
    /// mismatch.
    pub fn bool_value(&self, version: &str, default: bool) -> (bool, bool) {
        match self.value_at_version(version).as_bool() {
            Some(b) => (b, true),
            None => (default, false),
        }
    }

    /// The number value at `version`, or `default` and `false` on a type
    /// mismatch.
    pub fn number_value(&self, version: &str, default: f64) -> (f64, bool) {
        match self.value_at_version(version).as_number() {
            Some(n) => (n, true),
            None => (default, false),
        }
    }

    /// Decodes the custom value at `version` into `T`.
    ///
    /// A non-custom value yields `default` and `false`; a custom payload
    /// that does not decode into `T` is an error.
    pub fn custom_value<T: DeserializeOwned>(&self, version: &str, default: T) -> Result<(T, bool)> {
        match self.value_at_version(version).decode_custom()? {
            Some(value) => Ok((value, true)),
            None => Ok((default, false)),
        }
    }
}

fn check_non_overlapping(previous: &Override, next: &Override) -> Result<()> {
    let overlapping = match (&previous.maximum, &next.minimum) {
        (Some(max), Some(min)) => max > min,
        // an open side reaches into its neighbour
        _ => true,
    };

    if overlapping {
        return Err(Error::OverlappingOverrides {
            previous_maximum: previous.maximum_version().to_string(),
            next_minimum: next.minimum_version().to_string(),
        });
    }
    Ok(())
}

impl Serialize for Override {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Override", 3)?;
        state.serialize_field("minimumVersion", self.minimum_version())?;
        state.serialize_field("maximumVersion", self.maximum_version())?;
        state.serialize_field("value", &self.value)?;
        state.end()
    }
}

impl Serialize for OverrideableRule {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let len = if self.overrides.is_empty() { 2 } else { 3 };
        let mut state = serializer.serialize_struct("OverrideableRule", len)?;
        state.serialize_field("type", self.rule.rule_type().as_str())?;
        state.serialize_field("value", &self.rule)?;
        if self.overrides.is_empty() {
            state.skip_field("overrides")?;
        } else {
            state.serialize_field("overrides", &self.overrides)?;
        }
        state.end()
    }
}

/// Wire shape of a rule before its value is checked against its type.
#[derive(Deserialize)]
struct RuleDocument {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    value: Option<Box<RawValue>>,
    #[serde(default)]
    overrides: Vec<OverrideDocument>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OverrideDocument {
    #[serde(default)]
    minimum_version: String,
    #[serde(default)]
    maximum_version: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    value: Option<Box<RawValue>>,
}

impl TryFrom<RuleDocument> for OverrideableRule {
    type Error = Error;

    fn try_from(doc: RuleDocument) -> Result<Self> {
        let rule_type = RuleType::from_str(&doc.kind)?;
        let rule = Rule::decode_as(rule_type, doc.value.as_deref())?;

        let mut overrides = Vec::with_capacity(doc.overrides.len());
        for o in doc.overrides {
            if let Some(kind) = &o.kind {
                if RuleType::from_str(kind)? != rule_type {
                    return Err(Error::TypeMismatch {
                        expected: rule_type.as_str().to_string(),
                        value: kind.clone(),
                        message: "override type differs from its rule".to_string(),
                    });
                }
            }
            let value = Rule::decode_as(rule_type, o.value.as_deref())?;
            overrides.push(Override::new(&o.minimum_version, &o.maximum_version, value)?);
        }

        OverrideableRule::with_overrides(rule, overrides)
    }
}
