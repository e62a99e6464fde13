//! Typed circuit parameters.
//!
//! Implementations receive user input as `name -> {"rawValue": ..., "type": ...}`.
//! [`type_parameters`] resolves every entry to a native value. Typing fails
//! soft: a malformed entry is stored as `None` so the caller can tell "given
//! but unusable" apart from "not given at all".

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Declared type tag of a raw parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterType {
    String,
    Integer,
    Float,
    /// Passed through as a string.
    Unknown,
}

impl ParameterType {
    /// Parse a type tag; `None` for tags outside the supported set.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "String" => Some(Self::String),
            "Integer" | "Int" => Some(Self::Integer),
            "Float" => Some(Self::Float),
            "Unknown" => Some(Self::Unknown),
            _ => None,
        }
    }

    /// Convert a raw string to this type.
    pub fn convert(self, raw: &str) -> Option<TypedValue> {
        match self {
            Self::String | Self::Unknown => Some(TypedValue::String(raw.to_string())),
            Self::Integer => raw.trim().parse().ok().map(TypedValue::Integer),
            Self::Float => raw.trim().parse().ok().map(TypedValue::Float),
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "String"),
            Self::Integer => write!(f, "Integer"),
            Self::Float => write!(f, "Float"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// A resolved parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypedValue {
    Integer(i64),
    Float(f64),
    String(String),
}

impl TypedValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Integer(v) => Some(*v as f64),
            Self::String(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// Case-insensitive map of typed parameters.
///
/// Every key is lower-cased on insert and on lookup. A `None` value marks a
/// parameter that was supplied but could not be typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParameterDictionary {
    entries: BTreeMap<String, Option<TypedValue>>,
}

impl ParameterDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    fn normalize(name: &str) -> String {
        name.to_lowercase()
    }

    /// Insert under the lower-cased name, returning the previous entry.
    pub fn insert(&mut self, name: &str, value: Option<TypedValue>) -> Option<Option<TypedValue>> {
        self.entries.insert(Self::normalize(name), value)
    }

    /// `None` when absent, `Some(None)` when present but untyped.
    pub fn get(&self, name: &str) -> Option<&Option<TypedValue>> {
        self.entries.get(&Self::normalize(name))
    }

    /// The typed value, flattening absent and untyped entries.
    pub fn value(&self, name: &str) -> Option<&TypedValue> {
        self.get(name).and_then(Option::as_ref)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(&Self::normalize(name))
    }

    pub fn remove(&mut self, name: &str) -> Option<Option<TypedValue>> {
        self.entries.remove(&Self::normalize(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&TypedValue>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }
}

/// Resolve one `{"rawValue", "type"}` entry.
pub fn type_parameter(entry: &Value) -> Option<TypedValue> {
    let obj = entry.as_object()?;
    let raw = obj.get("rawValue").or_else(|| obj.get("value"))?;
    let tag = obj.get("type")?.as_str()?;
    let kind = ParameterType::from_tag(tag)?;
    let raw = match raw {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    kind.convert(&raw)
}

/// Resolve every entry of a raw parameter payload.
pub fn type_parameters(raw: &Map<String, Value>) -> ParameterDictionary {
    let mut typed = ParameterDictionary::new();
    for (name, entry) in raw {
        let value = type_parameter(entry);
        if value.is_none() {
            log::debug!("parameter '{name}' could not be typed: {entry}");
        }
        typed.insert(name, value);
    }
    typed
}
