//! Conversion between request/response JSON and stored documents

use bson::{Bson, Document};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Request body must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("Invalid extended JSON: {0}")]
    ExtendedJson(String),
}

/// Turn a JSON request body into a document. Extended JSON wrappers
/// such as `{"$oid": ...}` or `{"$date": ...}` become native values.
pub fn json_to_document(value: Value) -> Result<Document, FormatError> {
    match value {
        Value::Object(map) => {
            Document::try_from(map).map_err(|e| FormatError::ExtendedJson(e.to_string()))
        }
        Value::Array(_) => Err(FormatError::NotAnObject("an array")),
        Value::String(_) => Err(FormatError::NotAnObject("a string")),
        Value::Number(_) => Err(FormatError::NotAnObject("a number")),
        Value::Bool(_) => Err(FormatError::NotAnObject("a boolean")),
        Value::Null => Err(FormatError::NotAnObject("null")),
    }
}

/// Render a stored document as plain JSON: ObjectIds become hex strings and
/// datetimes RFC 3339 strings, other values use relaxed extended JSON.
pub fn document_to_json(document: Document) -> Value {
    let mut map = Map::with_capacity(document.len());
    for (key, value) in document {
        map.insert(key, bson_to_json(value));
    }
    Value::Object(map)
}

pub fn documents_to_json(documents: Vec<Document>) -> Value {
    Value::Array(documents.into_iter().map(document_to_json).collect())
}

fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => match dt.try_to_rfc3339_string() {
            Ok(s) => Value::String(s),
            Err(_) => Bson::DateTime(dt).into_relaxed_extjson(),
        },
        Bson::Document(doc) => document_to_json(doc),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        other => other.into_relaxed_extjson(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{doc, oid::ObjectId};
    use serde_json::json;

    #[test]
    fn body_must_be_object() {
        assert!(matches!(json_to_document(json!([1])), Err(FormatError::NotAnObject("an array"))));
        assert!(matches!(json_to_document(Value::Null), Err(FormatError::NotAnObject("null"))));
    }

    #[test]
    fn extended_json_is_honoured() {
        let document = json_to_document(json!({ "ref": { "$oid": "65f1c2a4b3d2e1f0a9b8c7d6" } })).unwrap();
        assert!(matches!(document.get("ref"), Some(Bson::ObjectId(_))));
    }

    #[test]
    fn object_ids_render_as_hex() {
        let id = ObjectId::parse_str("65f1c2a4b3d2e1f0a9b8c7d6").unwrap();
        let value = document_to_json(doc! {
            "_id": id,
            "color": "red",
            "parts": [{ "of": id }],
            "count": 3_i64,
        });
        assert_eq!(
            value,
            json!({
                "_id": "65f1c2a4b3d2e1f0a9b8c7d6",
                "color": "red",
                "parts": [{ "of": "65f1c2a4b3d2e1f0a9b8c7d6" }],
                "count": 3,
            })
        );
    }

    #[test]
    fn key_order_is_preserved() {
        let value = document_to_json(doc! { "z": 1, "a": 2, "m": 3 });
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn datetimes_render_as_rfc3339() {
        let dt = bson::DateTime::from_millis(0);
        let value = document_to_json(doc! { "at": dt });
        assert_eq!(value["at"], json!("1970-01-01T00:00:00Z"));
    }
}
