use indexmap::IndexMap;

pub use serde_json::Value;

/// Attribute values of one record, in declaration (or insertion) order.
pub type Row = IndexMap<String, Value>;

/// Returns `true` when an attribute is absent or explicitly null.
pub fn is_missing(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

/// Short type label used in diagnostics.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Converts a JSON object into a [`Row`]; any other value yields `None`.
pub fn row_from_value(value: Value) -> Option<Row> {
    match value {
        Value::Object(map) => Some(map.into_iter().collect()),
        _ => None,
    }
}
