//! Item Attributes
//!
//! Free-form extra fields an item may carry beyond the fixed schema.
//! Values are limited to a small closed set of primitives.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use super::entity::{DomainError, DomainResult};

/// Wire names of the fixed item fields; attributes may not shadow them
pub const RESERVED_NAMES: &[&str] = &[
    "id",
    "name",
    "department",
    "issuedDate",
    "categoryId",
    "serialNumber",
];

fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES.contains(&name)
}

/// A single attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl AttributeValue {
    fn from_json(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(AttributeValue::Bool(b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(AttributeValue::Integer)
                .or_else(|| n.as_f64().map(AttributeValue::Float)),
            serde_json::Value::String(s) => Some(AttributeValue::Text(s)),
            _ => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Integer(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Float(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

/// Name → value mapping of extra attributes.
///
/// Decoding drops entries whose value is not a primitive (null, arrays,
/// nested objects), so unexpected server bookkeeping fields never make a
/// record undecodable. Entries named like a fixed item field are dropped too.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Attributes(BTreeMap<String, AttributeValue>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.0.get(name)
    }

    /// Set an attribute; names of fixed item fields are rejected
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> DomainResult<()> {
        let name = name.into();
        if is_reserved(&name) {
            return Err(DomainError::InvalidInput(format!(
                "'{}' is a built-in item field, not an attribute",
                name
            )));
        }
        self.0.insert(name, value.into());
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<AttributeValue> {
        self.0.remove(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttributeValue)> {
        self.0.iter()
    }
}

impl<'de> Deserialize<'de> for Attributes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
        Ok(Self(
            raw.into_iter()
                .filter(|(k, _)| !is_reserved(k))
                .filter_map(|(k, v)| AttributeValue::from_json(v).map(|v| (k, v)))
                .collect(),
        ))
    }
}
