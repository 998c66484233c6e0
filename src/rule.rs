//! # Rule Values
//!
//! A [`Rule`] is a typed configuration value. The declared type tag of a
//! stored rule (`"string"`, `"number"`, `"boolean"` or `"custom"`) is
//! resolved once, at decode time, into a variant of the closed `Rule` enum;
//! everything downstream pattern-matches on the variant instead of
//! re-inspecting tags.
//!
//! `custom` values are kept as raw, undecoded JSON and are only interpreted
//! when a caller asks for them with a concrete type through
//! [`Rule::decode_custom`].

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::ser::Error as _;
use serde::{Serialize, Serializer};
use serde_json::value::RawValue;

use crate::error::{Error, Result};

/// The declared type of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleType {
    String,
    Number,
    Boolean,
    Custom,
}

impl RuleType {
    /// The tag used for this type in chamber documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleType::String => "string",
            RuleType::Number => "number",
            RuleType::Boolean => "boolean",
            RuleType::Custom => "custom",
        }
    }
}

impl FromStr for RuleType {
    type Err = Error;

    fn from_str(tag: &str) -> Result<Self> {
        match tag {
            "string" => Ok(RuleType::String),
            "number" => Ok(RuleType::Number),
            "boolean" => Ok(RuleType::Boolean),
            "custom" => Ok(RuleType::Custom),
            _ => Err(Error::UnsupportedType {
                tag: tag.to_string(),
            }),
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed rule value.
#[derive(Debug, Clone)]
pub enum Rule {
    String(String),
    Number(f64),
    Boolean(bool),
    /// Raw JSON payload, decoded on demand by the caller.
    Custom(Box<RawValue>),
}

impl Rule {
    /// Decodes a raw value against a type tag.
    ///
    /// Fails with [`Error::UnsupportedType`] for an unknown tag,
    /// [`Error::MissingValue`] when the value is absent or null, and
    /// [`Error::TypeMismatch`] when the value does not match the tag.
    pub fn decode(tag: &str, raw: Option<&RawValue>) -> Result<Self> {
        let rule_type = RuleType::from_str(tag)?;
        Self::decode_as(rule_type, raw)
    }

    /// Decodes a raw value against an already resolved type.
    pub fn decode_as(rule_type: RuleType, raw: Option<&RawValue>) -> Result<Self> {
        let raw = match raw {
            Some(raw) if !is_empty_payload(raw) => raw,
            _ => {
                return Err(Error::MissingValue {
                    tag: rule_type.as_str().to_string(),
                })
            }
        };

        let mismatch = |e: serde_json::Error| Error::TypeMismatch {
            expected: rule_type.as_str().to_string(),
            value: raw.get().to_string(),
            message: e.to_string(),
        };

        match rule_type {
            RuleType::String => serde_json::from_str(raw.get())
                .map(Rule::String)
                .map_err(mismatch),
            RuleType::Number => serde_json::from_str(raw.get())
                .map(Rule::Number)
                .map_err(mismatch),
            RuleType::Boolean => serde_json::from_str(raw.get())
                .map(Rule::Boolean)
                .map_err(mismatch),
            RuleType::Custom => Ok(Rule::Custom(raw.to_owned())),
        }
    }

    /// Builds a custom rule from a JSON document.
    pub fn custom_from_json(json: &str) -> Result<Self> {
        let raw = RawValue::from_string(json.to_string())?;
        Ok(Rule::Custom(raw))
    }

    /// Builds a custom rule by serializing `value` to JSON.
    pub fn custom_from<T: Serialize>(value: &T) -> Result<Self> {
        let raw = serde_json::value::to_raw_value(value)?;
        Ok(Rule::Custom(raw))
    }

    /// The type of this value.
    pub fn rule_type(&self) -> RuleType {
        match self {
            Rule::String(_) => RuleType::String,
            Rule::Number(_) => RuleType::Number,
            Rule::Boolean(_) => RuleType::Boolean,
            Rule::Custom(_) => RuleType::Custom,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Rule::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Rule::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Rule::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_custom(&self) -> Option<&RawValue> {
        match self {
            Rule::Custom(raw) => Some(raw),
            _ => None,
        }
    }

    /// Decodes a custom payload into `T`.
    ///
    /// Returns `Ok(None)` when this value is not a custom value.
    pub fn decode_custom<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        match self {
            Rule::Custom(raw) => Ok(Some(serde_json::from_str(raw.get())?)),
            _ => Ok(None),
        }
    }
}

fn is_empty_payload(raw: &RawValue) -> bool {
    let text = raw.get().trim();
    text.is_empty() || text == "null"
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Rule::String(a), Rule::String(b)) => a == b,
            (Rule::Number(a), Rule::Number(b)) => a == b,
            (Rule::Boolean(a), Rule::Boolean(b)) => a == b,
            (Rule::Custom(a), Rule::Custom(b)) => a.get() == b.get(),
            _ => false,
        }
    }
}

impl Serialize for Rule {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Rule::String(s) => serializer.serialize_str(s),
            // JSON has no spelling for NaN or infinity
            Rule::Number(n) if !n.is_finite() => Err(S::Error::custom(format!(
                "number rule must be finite, got {}",
                n
            ))),
            Rule::Number(n) => serializer.serialize_f64(*n),
            Rule::Boolean(b) => serializer.serialize_bool(*b),
            Rule::Custom(raw) => raw.serialize(serializer),
        }
    }
}

impl From<&str> for Rule {
    fn from(value: &str) -> Self {
        Rule::String(value.to_string())
    }
}

impl From<String> for Rule {
    fn from(value: String) -> Self {
        Rule::String(value)
    }
}

impl From<f64> for Rule {
    fn from(value: f64) -> Self {
        Rule::Number(value)
    }
}

impl From<bool> for Rule {
    fn from(value: bool) -> Self {
        Rule::Boolean(value)
    }
}
