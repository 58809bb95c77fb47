use bson::{oid::ObjectId, Bson, Document};
use serde_json::Value;

use super::error::FilterError;

pub struct FilterWhere;

impl FilterWhere {
    /// Parse the JSON-encoded `query` parameter into a filter document.
    /// Absent or blank input is the empty predicate.
    pub fn parse(raw: Option<&str>) -> Result<Document, FilterError> {
        let raw = match raw.map(str::trim) {
            Some(s) if !s.is_empty() => s,
            _ => return Ok(Document::new()),
        };

        match serde_json::from_str::<Value>(raw)? {
            Value::Object(map) => Ok(Document::try_from(map)?),
            other => Err(FilterError::MalformedFilter(format!(
                "filter must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Replace a top-level string `_id` with its ObjectId form.
    /// Anything else under `_id` (operator documents, numbers) is left alone.
    pub fn coerce_object_id(filter: &mut Document) -> Result<(), FilterError> {
        if let Some(Bson::String(raw)) = filter.get("_id") {
            let oid = parse_object_id(raw)?;
            filter.insert("_id", oid);
        }
        Ok(())
    }
}

pub fn parse_object_id(raw: &str) -> Result<ObjectId, FilterError> {
    ObjectId::parse_str(raw)
        .map_err(|_| FilterError::InvalidIdentifier(format!("'{}' is not a valid ObjectId", raw)))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
