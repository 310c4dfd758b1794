//! Element records supplied by the modeling host

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Raw attribute value as exported by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Number(f64),
    Text(String),
    /// Anything else the host exported (booleans, arrays, objects)
    Other(serde_json::Value),
}

impl AttributeValue {
    /// Numeric view of the value; text is parsed leniently (surrounding whitespace ignored)
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(n) => Some(*n),
            AttributeValue::Text(t) => t.trim().parse().ok(),
            AttributeValue::Other(_) => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Number(n) => write!(f, "{}", n),
            AttributeValue::Text(t) => write!(f, "{}", t),
            AttributeValue::Other(v) => write!(f, "{}", v),
        }
    }
}

/// One building element as dumped by the host.
///
/// Attributes are keyed by binding key (built-in parameter name or shared
/// parameter GUID). A `null` value means the parameter exists but is unset.
/// Hosts export integer ids; they are kept as text.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementRecord {
    #[serde(deserialize_with = "id_from_text_or_number")]
    pub id: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, Option<AttributeValue>>,
}

impl ElementRecord {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn with_attribute(mut self, key: &str, value: AttributeValue) -> Self {
        self.attributes.insert(key.to_string(), Some(value));
        self
    }

    pub fn with_number(self, key: &str, value: f64) -> Self {
        self.with_attribute(key, AttributeValue::Number(value))
    }

    /// Look up an attribute by its exact key
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key).and_then(Option::as_ref)
    }

    /// Look up an attribute, falling back to an ASCII case-insensitive key
    /// match. Used for GUID keys, which hosts write in either case.
    pub fn get_ignore_case(&self, key: &str) -> Option<&AttributeValue> {
        match self.attributes.get(key) {
            Some(value) => value.as_ref(),
            None => self
                .attributes
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .and_then(|(_, v)| v.as_ref()),
        }
    }
}

fn id_from_text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Signed(i64),
        Unsigned(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => id,
        RawId::Signed(id) => id.to_string(),
        RawId::Unsigned(id) => id.to_string(),
    })
}

/// Top-level shape of an element dump: `{ "elements": [ ... ] }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElementDocument {
    pub elements: Vec<ElementRecord>,
}
