use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::framework::RemoteEntity;

/// Field values of a record, keyed by name. Never contains `id`.
pub type Fields = Map<String, Value>;

/// The field a new record must carry, non-empty, before it is sent.
pub const IDENTIFYING_FIELD: &str = "title";

/// A server-assigned record identifier.
///
/// Remote resources use either numbers or strings. Any JSON number is accepted
/// (negative and decimal ids included) and compared strictly: `1`, `1.0` and
/// `"1"` are three different ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(Number),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for RecordId {
    fn from(n: u64) -> Self {
        RecordId::Number(n.into())
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::Text(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        RecordId::Text(s)
    }
}

impl FromStr for RecordId {
    type Err = std::convert::Infallible;

    /// A valid JSON number becomes a numeric id, anything else a text id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<Number>()
            .map(RecordId::Number)
            .unwrap_or_else(|_| RecordId::Text(s.to_string())))
    }
}

/// One item of a remote collection: an `id` plus opaque fields.
///
/// # Actor Framework
/// This struct implements the [`RemoteEntity`] trait, allowing it to be mirrored by a
/// [`SyncActor`](crate::framework::SyncActor). Creation and updates both send plain
/// [`Fields`]; the server decides the final shape of the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    id: RecordId,
    #[serde(flatten)]
    fields: Fields,
}

impl Record {
    /// Creates a record. A stray `id` key in `fields` is dropped.
    pub fn new(id: impl Into<RecordId>, mut fields: Fields) -> Self {
        fields.remove("id");
        Self { id: id.into(), fields }
    }

    /// Decodes a record from a JSON object; fails without an `id`.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn title(&self) -> Option<&str> {
        self.get(IDENTIFYING_FIELD).and_then(Value::as_str)
    }

    /// Whether the server flagged this record as deleted (`isDeleted: true`).
    pub fn is_deleted(&self) -> bool {
        self.get("isDeleted").and_then(Value::as_bool).unwrap_or(false)
    }
}

impl RemoteEntity for Record {
    type Id = RecordId;
    type Fields = Fields;
    type Patch = Fields;

    fn id(&self) -> RecordId {
        self.id.clone()
    }

    /// A new record needs a non-empty identifying field.
    fn validate_create(fields: &Fields) -> Result<(), String> {
        match fields.get(IDENTIFYING_FIELD).and_then(Value::as_str) {
            Some(title) if !title.is_empty() => Ok(()),
            _ => Err(format!("{} is required", IDENTIFYING_FIELD)),
        }
    }
}

/// Builds a [`Fields`] map holding only the identifying field.
pub fn titled(title: impl Into<String>) -> Fields {
    let mut fields = Fields::new();
    fields.insert(IDENTIFYING_FIELD.to_string(), Value::String(title.into()));
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_keeps_unknown_fields() {
        let record = Record::from_value(json!({
            "id": 1,
            "title": "Essence Mascara",
            "price": 9.99,
            "tags": ["beauty"]
        }))
        .unwrap();

        assert_eq!(record.id(), &RecordId::from(1));
        assert_eq!(record.title(), Some("Essence Mascara"));
        assert_eq!(record.get("price"), Some(&json!(9.99)));
        assert!(!record.fields().contains_key("id"));

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["id"], json!(1));
        assert_eq!(back["tags"], json!(["beauty"]));
    }

    #[test]
    fn test_record_requires_id() {
        assert!(Record::from_value(json!({ "title": "no id" })).is_err());
    }

    #[test]
    fn test_record_id_forms() {
        let text: RecordId = serde_json::from_value(json!("abc")).unwrap();
        assert_eq!(text, RecordId::from("abc"));
        assert_ne!(RecordId::from(1), RecordId::from("1"));
        assert_eq!("42".parse::<RecordId>().unwrap(), RecordId::from(42));
        assert_eq!("-3".parse::<RecordId>().unwrap(), RecordId::Number(Number::from(-3)));
        assert_eq!("007".parse::<RecordId>().unwrap(), RecordId::from("007"));
        assert_eq!("p-42".parse::<RecordId>().unwrap(), RecordId::from("p-42"));
        assert_eq!(RecordId::from(7).to_string(), "7");
    }

    #[test]
    fn test_signed_and_decimal_ids_decode() {
        let negative = Record::from_value(json!({ "id": -1, "title": "below zero" })).unwrap();
        assert_eq!(negative.id(), &RecordId::Number(Number::from(-1)));
        assert_eq!(negative.id().to_string(), "-1");

        let decimal = Record::from_value(json!({ "id": 1.5, "title": "halfway" })).unwrap();
        assert_eq!(decimal.id().to_string(), "1.5");
        assert_ne!(decimal.id(), &RecordId::from(1));

        let whole_float: RecordId = serde_json::from_value(json!(1.0)).unwrap();
        assert_ne!(whole_float, RecordId::from(1));
    }

    #[test]
    fn test_new_drops_stray_id() {
        let mut fields = titled("A");
        fields.insert("id".into(), json!(99));
        let record = Record::new(1, fields);
        assert_eq!(record.id(), &RecordId::from(1));
        assert!(record.get("id").is_none());
    }

    #[test]
    fn test_validate_create() {
        assert!(Record::validate_create(&titled("C")).is_ok());
        assert_eq!(
            Record::validate_create(&titled("")),
            Err("title is required".to_string())
        );
        assert!(Record::validate_create(&Fields::new()).is_err());
    }

    #[test]
    fn test_deleted_flag() {
        let record = Record::from_value(json!({ "id": 1, "isDeleted": true })).unwrap();
        assert!(record.is_deleted());
    }
}
