//! Participant records with a runtime-defined field set.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use super::error::DomainError;

/// Primary key of a participant row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(i64);

impl ParticipantId {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for ParticipantId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single field value. Field definitions are configured at runtime, so the
/// value shape is only known per row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Number(Number),
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Convert an arbitrary JSON value coming out of the system of record.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Text(if flag { "1" } else { "0" }.to_string()),
            Value::Number(number) => Self::Number(number),
            Value::String(text) => Self::Text(text),
            Value::Array(items) => Self::List(items.into_iter().map(list_item).collect()),
            other @ Value::Object(_) => Self::Text(other.to_string()),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Number(number) => Value::Number(number.clone()),
            Self::Text(text) => Value::String(text.clone()),
            Self::List(items) => Value::Array(items.iter().cloned().map(Value::String).collect()),
        }
    }
}

fn list_item(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// One participant row: its id plus every field stored for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantRecord {
    pub id: ParticipantId,
    fields: BTreeMap<String, FieldValue>,
}

impl ParticipantRecord {
    pub fn new(id: ParticipantId) -> Self {
        Self {
            id,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Build a record from a JSON object row.
    pub fn from_json_row(id: ParticipantId, row: Value) -> Result<Self, DomainError> {
        match row {
            Value::Object(map) => Ok(Self::from_json_map(id, map)),
            Value::Null => Ok(Self::new(id)),
            other => Err(DomainError::invalid_row(format!(
                "participant {id}: expected a JSON object, found `{other}`"
            ))),
        }
    }

    fn from_json_map(id: ParticipantId, map: Map<String, Value>) -> Self {
        let fields = map
            .into_iter()
            .map(|(name, value)| (name, FieldValue::from_json(value)))
            .collect();
        Self { id, fields }
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    /// Field map as a JSON object, the shape persisted in the system of record.
    pub fn fields_json(&self) -> Value {
        let map: Map<String, Value> = self
            .fields
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect();
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn json_row_maps_every_value_shape() {
        let row = json!({
            "first_name": "Ada",
            "age": 36,
            "score": 4.5,
            "interests": ["math", 7, null],
            "approved": true,
            "notes": null,
            "address": {"city": "London"}
        });

        let record = ParticipantRecord::from_json_row(ParticipantId::new(7), row)
            .expect("object rows decode");

        assert_eq!(record.get("first_name"), Some(&FieldValue::text("Ada")));
        assert_eq!(record.get("age"), Some(&FieldValue::from(36)));
        assert!(matches!(record.get("score"), Some(FieldValue::Number(_))));
        assert_eq!(
            record.get("interests"),
            Some(&FieldValue::List(vec![
                "math".to_string(),
                "7".to_string(),
                String::new()
            ]))
        );
        assert_eq!(record.get("approved"), Some(&FieldValue::text("1")));
        assert!(record.get("notes").is_some_and(FieldValue::is_null));
        assert_eq!(
            record.get("address").and_then(FieldValue::as_str),
            Some(r#"{"city":"London"}"#)
        );
    }

    #[test]
    fn non_object_rows_are_rejected() {
        let err = ParticipantRecord::from_json_row(ParticipantId::new(3), json!([1, 2]))
            .expect_err("arrays are not rows");
        assert!(matches!(err, DomainError::InvalidRow { .. }));
    }

    #[test]
    fn record_serializes_as_plain_json() {
        let record = ParticipantRecord::new(ParticipantId::new(12))
            .with_field("email", "ada@example.org")
            .with_field("groups", vec!["a".to_string(), "b".to_string()]);

        let value = serde_json::to_value(&record).expect("serialize");
        assert_eq!(
            value,
            json!({"id": 12, "fields": {"email": "ada@example.org", "groups": ["a", "b"]}})
        );

        let decoded: ParticipantRecord = serde_json::from_value(value).expect("deserialize");
        assert_eq!(decoded, record);
    }

    #[test]
    fn fields_json_drops_the_wrapper() {
        let record = ParticipantRecord::new(ParticipantId::new(1))
            .with_field("city", "Oslo")
            .with_field("visits", 3);
        assert_eq!(record.fields_json(), json!({"city": "Oslo", "visits": 3}));
    }
}
