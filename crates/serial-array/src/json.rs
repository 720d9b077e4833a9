//! JSON and serde integration.
//!
//! Enable the `serde` feature to use this module. It covers the two places
//! the codec meets JSON: item-ID lists arriving in request bodies, and row
//! structs whose list column holds serial array text.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Value as JsonValue};

use crate::error::{ErrorKind, Result, SerialArrayError};
use crate::parser::{from_str_with_config, ParserConfig};
use crate::value::{SerialArray, SerialValue};
use crate::writer::{to_string, SerialElement};

/// Convert a decoded value to JSON. Arrays become JSON arrays.
///
/// # Example
///
/// ```rust
/// use serial_array::{to_json, Parser};
///
/// let value = Parser::new(b"a:2:{i:0;i:1;i:1;a:1:{i:0;i:2;}}").parse().unwrap();
/// assert_eq!(to_json(&value), serde_json::json!([1, [2]]));
/// ```
pub fn to_json(value: &SerialValue) -> JsonValue {
    match value {
        SerialValue::Int(i) => json!(*i),
        SerialValue::Array(items) => JsonValue::Array(items.iter().map(to_json).collect()),
    }
}

/// Convert a decoded value to a JSON string.
pub fn to_json_string(value: &SerialValue) -> serde_json::Result<String> {
    serde_json::to_string(&to_json(value))
}

impl SerialElement for JsonValue {
    fn to_serial_int(&self) -> Option<i64> {
        let JsonValue::Number(n) = self else {
            return None;
        };
        n.as_i64().or_else(|| n.as_f64().and_then(|f| f.to_serial_int()))
    }

    fn describe(&self) -> String {
        let kind = match self {
            JsonValue::Null => "null",
            JsonValue::Bool(_) => "boolean",
            JsonValue::Number(_) => "number",
            JsonValue::String(_) => "string",
            JsonValue::Array(_) => "array",
            JsonValue::Object(_) => "object",
        };
        format!("JSON {} {}", kind, self)
    }
}

/// Encode a JSON array of integers, e.g. an item-ID list from a request body.
///
/// # Example
///
/// ```rust
/// use serial_array::to_string_from_json;
///
/// let body = serde_json::json!([33027, 5333]);
/// assert_eq!(to_string_from_json(&body).unwrap(), "a:2:{i:0;i:33027;i:1;i:5333;}");
/// assert!(to_string_from_json(&serde_json::json!([1.5])).is_err());
/// ```
pub fn to_string_from_json(value: &JsonValue) -> Result<String> {
    match value {
        JsonValue::Array(items) => to_string(items),
        other => Err(SerialArrayError::new(
            ErrorKind::UnsupportedElementType(other.describe()),
            0,
        )
        .with_context("expected a JSON array")),
    }
}

/// Serializes as the wire text, matching how the list column is stored.
impl Serialize for SerialArray {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_serial_string())
    }
}

struct SerialArrayVisitor {
    config: ParserConfig,
}

impl<'de> Visitor<'de> for SerialArrayVisitor {
    type Value = SerialArray;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a serial array string such as \"a:1:{i:0;i:33027;}\"")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<SerialArray, E> {
        from_str_with_config(v, self.config).map_err(E::custom)
    }
}

/// Deserializes from the wire text with the strict default configuration.
impl<'de> Deserialize<'de> for SerialArray {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_str(SerialArrayVisitor {
            config: ParserConfig::default(),
        })
    }
}

/// Deserialize a possibly dirty legacy column.
///
/// Use with `#[serde(deserialize_with = "serial_array::deserialize_lenient")]`.
pub fn deserialize_lenient<'de, D>(deserializer: D) -> std::result::Result<SerialArray, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_str(SerialArrayVisitor {
        config: ParserConfig::lenient(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct ListRow {
        name: String,
        items: SerialArray,
    }

    #[derive(Debug, Deserialize)]
    struct LegacyListRow {
        #[serde(deserialize_with = "deserialize_lenient")]
        items: SerialArray,
    }

    #[test]
    fn test_to_json_nested() {
        let value = Parser::new(b"a:2:{i:0;i:-4;i:1;a:0:{}}").parse().unwrap();
        assert_eq!(to_json(&value), json!([-4, []]));
        assert_eq!(to_json_string(&value).unwrap(), "[-4,[]]");
    }

    #[test]
    fn test_json_elements() {
        assert_eq!(
            to_string_from_json(&json!([1, 2.0, -3])).unwrap(),
            "a:3:{i:0;i:1;i:1;i:2;i:2;i:-3;}"
        );
        let err = to_string_from_json(&json!([1, "2"])).unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::UnsupportedElementType("JSON string \"2\"".into())
        );
        assert_eq!(err.position, 1);
    }

    #[test]
    fn test_json_not_array() {
        let err = to_string_from_json(&json!({"items": []})).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnsupportedElementType(_)));
    }

    #[test]
    fn test_row_round_trip() {
        let row = ListRow {
            name: "Gear".into(),
            items: vec![33027, 5333].into(),
        };
        let text = serde_json::to_string(&row).unwrap();
        assert_eq!(
            text,
            r#"{"name":"Gear","items":"a:2:{i:0;i:33027;i:1;i:5333;}"}"#
        );
        assert_eq!(serde_json::from_str::<ListRow>(&text).unwrap(), row);
    }

    #[test]
    fn test_dirty_row_needs_lenient() {
        let text = r#"{"name":"Old","items":"a:3:{i:0;i:1;i:2;i:3;}"}"#;
        let err = serde_json::from_str::<ListRow>(text).unwrap_err();
        assert!(err.to_string().contains("dirty array"));

        let row: LegacyListRow = serde_json::from_str(text).unwrap();
        assert_eq!(row.items.as_slice(), &[1, 3]);
    }
}
