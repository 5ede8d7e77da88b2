//! # Linked Data
//!
//! Pages embed a JSON-LD description of their main entity. Several video
//! fields read it as their primary source. Locating and parsing it can fail
//! in two independent ways (no `<script>`, or a script that is not a JSON
//! object); both simply mean "no payload".

use crate::errors::LookupError;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use vidextract_html::{Document, Selectable};

/// The parsed payload. Immutable once located.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedData(Map<String, Value>);

impl LinkedData {
    /// Finds the payload node with `selector` and parses its text.
    pub fn locate(document: &Document, selector: &str) -> Option<Self> {
        let Some(node) = document.select_first(selector) else {
            debug!(selector, "No linked data payload in document");
            return None;
        };
        Self::from_json(&node.text())
    }

    /// Parses a raw payload. Anything but a JSON object yields `None`.
    pub fn from_json(raw: &str) -> Option<Self> {
        match serde_json::from_str::<Value>(raw.trim()) {
            Ok(Value::Object(map)) => Some(Self(map)),
            Ok(other) => {
                warn!("Linked data payload is not an object: {}", type_name(&other));
                None
            }
            Err(e) => {
                warn!("Linked data payload could not be parsed: {e}");
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// A required string value.
    pub fn str_field(&self, key: &str) -> Result<&str, LookupError> {
        match self.get(key) {
            None | Some(Value::Null) => Err(LookupError::Absent(key.to_string())),
            Some(Value::String(s)) => Ok(s.as_str()),
            Some(_) => Err(wrong_type(key, "a string")),
        }
    }

    /// An optional string value; `null` reads as absent.
    pub fn opt_str_field(&self, key: &str) -> Result<Option<&str>, LookupError> {
        match self.str_field(key) {
            Ok(s) => Ok(Some(s)),
            Err(LookupError::Absent(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn array_field(&self, key: &str) -> Result<&[Value], LookupError> {
        match self.get(key) {
            None | Some(Value::Null) => Err(LookupError::Absent(key.to_string())),
            Some(Value::Array(items)) => Ok(items.as_slice()),
            Some(_) => Err(wrong_type(key, "an array")),
        }
    }

    /// A non-negative count, given either as a JSON number or as a numeric
    /// string (`"interactionCount": "12345"`).
    pub fn count_field(&self, key: &str) -> Result<u64, LookupError> {
        match self.get(key) {
            None | Some(Value::Null) => Err(LookupError::Absent(key.to_string())),
            Some(Value::Number(n)) => n
                .as_u64()
                .or_else(|| {
                    n.as_f64()
                        .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                        .map(|f| f as u64)
                })
                .ok_or_else(|| wrong_type(key, "a count")),
            Some(Value::String(s)) => s
                .trim()
                .parse::<u64>()
                .map_err(|_| wrong_type(key, "a count")),
            Some(_) => Err(wrong_type(key, "a count")),
        }
    }
}

fn wrong_type(key: &str, expected: &'static str) -> LookupError {
    LookupError::WrongType {
        key: key.to_string(),
        expected,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
