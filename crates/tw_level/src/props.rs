//! Free-form property bags attached to maps, layers, tiles and objects.
//!
//! Map editors export properties either as a plain object
//! (`{"solid": "true"}`) or as a list of typed entries
//! (`[{"name": "solid", "type": "bool", "value": true}]`). Both forms land in
//! the same [`PropertyBag`]. Accessors are lenient about representation: a
//! boolean may arrive as `true` or `"true"`, a number as `12` or `"12"`.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawProperties")]
pub struct PropertyBag(BTreeMap<String, Value>);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawProperties {
    Map(BTreeMap<String, Value>),
    List(Vec<RawProperty>),
}

#[derive(Deserialize)]
struct RawProperty {
    name: String,
    #[serde(default)]
    value: Value,
}

impl From<RawProperties> for PropertyBag {
    fn from(raw: RawProperties) -> Self {
        match raw {
            RawProperties::Map(map) => Self(map),
            RawProperties::List(list) => {
                Self(list.into_iter().map(|p| (p.name, p.value)).collect())
            }
        }
    }
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for tests and programmatic maps.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String form of a property. Numbers and booleans are stringified.
    pub fn get_str(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Only `true` and `"true"` count as true; any other present value is false.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.0.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => Some(s.trim() == "true"),
            Value::Null => None,
            _ => Some(false),
        }
    }

    pub fn flag(&self, key: &str) -> bool {
        self.get_bool(key).unwrap_or(false)
    }

    pub fn get_f32(&self, key: &str) -> Option<f32> {
        match self.0.get(key)? {
            Value::Number(n) => n.as_f64().map(|v| v as f32),
            Value::String(s) => s.trim().parse::<f32>().ok(),
            _ => None,
        }
    }

    pub fn get_u32(&self, key: &str) -> Option<u32> {
        let v = self.get_f32(key)?;
        if v.is_finite() && v >= 0.0 {
            Some(v as u32)
        } else {
            None
        }
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        match self.0.get(key)? {
            Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|v| v.max(0.0) as u64)),
            Value::String(s) => s.trim().parse::<f64>().ok().map(|v| v.max(0.0) as u64),
            _ => None,
        }
    }

    /// A JSON-valued property, given either inline or as an encoded string.
    pub fn get_json(&self, key: &str) -> Result<Option<Value>, String> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => serde_json::from_str(s)
                .map(Some)
                .map_err(|e| format!("property '{}' is not valid JSON: {e}", key)),
            Some(other) => Ok(Some(other.clone())),
        }
    }
}

impl From<serde_json::Map<String, Value>> for PropertyBag {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        Self(map.into_iter().collect())
    }
}
