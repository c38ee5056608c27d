//! Typed view of the records returned by the Open5e API.
//!
//! Open5e records are loose JSON objects. Documents are identified by a
//! `title`, everything else by a `name`. The discriminant is decided once,
//! here, so the rest of the crate never has to probe for keys.

use serde_json::{Map, Value};
use thiserror::Error;

/// Lower-case a string and strip all whitespace.
///
/// Applied identically to user input and to every entity label before
/// comparison.
pub fn normalize(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// A single Open5e record.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    /// Document-like record, keyed by `title`.
    Document { title: String, fields: Map<String, Value> },
    /// Any other record, keyed by `name`.
    Named { name: String, fields: Map<String, Value> },
}

/// A record carrying neither a `title` nor a `name`.
///
/// Not fatal: the record is skipped for matching and handed back so it
/// can be reported.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("entity has neither a title nor a name: {raw}")]
pub struct UnknownEntityKind {
    /// The offending record exactly as received.
    pub raw: Value,
}

impl TryFrom<Value> for Entity {
    type Error = UnknownEntityKind;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(fields) = value else {
            return Err(UnknownEntityKind { raw: value });
        };

        if let Some(title) = fields.get("title").and_then(Value::as_str) {
            return Ok(Entity::Document {
                title: title.to_string(),
                fields,
            });
        }
        if let Some(name) = fields.get("name").and_then(Value::as_str) {
            return Ok(Entity::Named {
                name: name.to_string(),
                fields,
            });
        }

        Err(UnknownEntityKind {
            raw: Value::Object(fields),
        })
    }
}

impl Entity {
    /// The discriminant used for matching (`title` or `name`).
    pub fn label(&self) -> &str {
        match self {
            Entity::Document { title, .. } => title,
            Entity::Named { name, .. } => name,
        }
    }

    /// All fields of the record, the discriminant included.
    pub fn fields(&self) -> &Map<String, Value> {
        match self {
            Entity::Document { fields, .. } | Entity::Named { fields, .. } => fields,
        }
    }

    /// Category directory, present only on broad search results.
    pub fn route(&self) -> Option<&str> {
        self.str_field("route")
    }

    /// First whitespace-delimited word of the label.
    pub fn first_word(&self) -> &str {
        self.label().split_whitespace().next().unwrap_or("")
    }

    /// Raw field lookup.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields().get(key)
    }

    /// String field, `None` when missing or not a string.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Render any scalar field as display text.
    ///
    /// Strings are returned as-is, numbers and booleans are stringified,
    /// null and missing fields become `None`.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// Like [`Entity::text`] but empty strings count as missing.
    pub fn non_empty(&self, key: &str) -> Option<String> {
        self.text(key).filter(|s| !s.trim().is_empty())
    }

    /// Array field as a slice, empty when missing.
    pub fn list(&self, key: &str) -> &[Value] {
        self.get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The record serialized back to pretty JSON.
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self.fields()).unwrap_or_default()
    }
}
