//! Message values and their wire form.
//!
//! [`Value`] is what behaviors send and receive. [`WireValue`] is the same
//! tree after every live [`Reference`] has been replaced by a token string,
//! which makes it safe to serialize. Conversion between the two needs a
//! token table and lives in the domain crate; this module only knows how
//! to render a [`WireValue`] to JSON text and back.

use std::collections::BTreeMap;

use serde_json::Number;

use crate::error::{MarshalError, Result};
use crate::reference::Reference;

/// Prefix marking a JSON string as a literal rather than a token.
pub const LITERAL_SENTINEL: char = ':';

/// Deepest nesting of arrays and objects a message may have.
///
/// Kept well under the recursion limit of the JSON parser, so anything
/// that encodes also parses on the receiving side.
pub const MAX_NESTING_DEPTH: usize = 64;

/// An error-like value, flattened to `{message, stack}` on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorValue {
    pub message: String,
    pub stack: Option<String>,
}

impl ErrorValue {
    /// Error value with a message and no stack.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack: None,
        }
    }

    /// Attach a stack description.
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Capture a Rust error; its source chain becomes the stack.
    pub fn from_error(error: &(dyn std::error::Error + 'static)) -> Self {
        let mut chain = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            chain.push(cause.to_string());
            source = cause.source();
        }
        Self {
            message: error.to_string(),
            stack: (!chain.is_empty()).then(|| chain.join("\n")),
        }
    }
}

/// An application-level message.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
    /// A live capability, local or proxied.
    Ref(Reference),
    Error(ErrorValue),
}

impl Value {
    /// Build an object from key/value pairs.
    pub fn object<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Object(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Convert plain JSON data. Every JSON string becomes a literal string.
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Field of an object, if this is one.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(key),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            Value::Ref(r) => Some(r),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(n.into())
    }
}

impl From<f64> for Value {
    /// Non-finite floats have no JSON form and become `Null`.
    fn from(n: f64) -> Self {
        Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

impl From<Reference> for Value {
    fn from(r: Reference) -> Self {
        Value::Ref(r)
    }
}

impl From<ErrorValue> for Value {
    fn from(e: ErrorValue) -> Self {
        Value::Error(e)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

/// A value ready for the wire: references have become tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    Null,
    Bool(bool),
    Number(Number),
    /// A literal string, written with the sentinel prefix.
    Literal(String),
    /// A capability token, written verbatim.
    Token(String),
    Array(Vec<WireValue>),
    Map(BTreeMap<String, WireValue>),
}

impl WireValue {
    /// Render to a JSON value, applying the sentinel convention.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            WireValue::Null => serde_json::Value::Null,
            WireValue::Bool(b) => serde_json::Value::Bool(*b),
            WireValue::Number(n) => serde_json::Value::Number(n.clone()),
            WireValue::Literal(s) => serde_json::Value::String(format!("{LITERAL_SENTINEL}{s}")),
            WireValue::Token(t) => serde_json::Value::String(t.clone()),
            WireValue::Array(items) => {
                serde_json::Value::Array(items.iter().map(WireValue::to_json).collect())
            }
            WireValue::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }

    /// Interpret a JSON value: sentinel-prefixed strings are literals, all
    /// other strings are tokens.
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => WireValue::Null,
            serde_json::Value::Bool(b) => WireValue::Bool(b),
            serde_json::Value::Number(n) => WireValue::Number(n),
            serde_json::Value::String(s) => match s.strip_prefix(LITERAL_SENTINEL) {
                Some(literal) => WireValue::Literal(literal.to_string()),
                None => WireValue::Token(s),
            },
            serde_json::Value::Array(items) => {
                WireValue::Array(items.into_iter().map(WireValue::from_json).collect())
            }
            serde_json::Value::Object(map) => WireValue::Map(
                map.into_iter()
                    .map(|(k, v)| (k, WireValue::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Serialize to wire text.
    pub fn to_json_text(&self) -> Result<String> {
        serde_json::to_string(&self.to_json()).map_err(|e| MarshalError::Encoding(e.to_string()))
    }

    /// Parse wire text.
    pub fn from_json_text(text: &str) -> Result<Self> {
        let json: serde_json::Value =
            serde_json::from_str(text).map_err(|e| MarshalError::Encoding(e.to_string()))?;
        Ok(Self::from_json(json))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_literal_gets_sentinel() {
        let text = WireValue::Literal("hello".into()).to_json_text().unwrap();
        assert_eq!(text, r#"":hello""#);
    }

    #[test]
    fn test_token_is_verbatim() {
        let text = WireValue::Token("dom#abc?xyz".into()).to_json_text().unwrap();
        assert_eq!(text, r#""dom#abc?xyz""#);
    }

    #[test]
    fn test_token_lookalike_literal_stays_literal() {
        let literal = WireValue::Literal("dom#abc?xyz".into());
        let text = literal.to_json_text().unwrap();

        assert_eq!(text, r#"":dom#abc?xyz""#);
        assert_eq!(WireValue::from_json_text(&text).unwrap(), literal);
    }

    #[test]
    fn test_literal_starting_with_sentinel() {
        // Only the first sentinel is stripped
        let literal = WireValue::Literal(":already".into());
        let text = literal.to_json_text().unwrap();

        assert_eq!(text, r#""::already""#);
        assert_eq!(WireValue::from_json_text(&text).unwrap(), literal);
    }

    #[test]
    fn test_empty_literal() {
        let text = WireValue::Literal(String::new()).to_json_text().unwrap();
        assert_eq!(text, r#"":""#);
        assert_eq!(
            WireValue::from_json_text(&text).unwrap(),
            WireValue::Literal(String::new())
        );
    }

    #[test]
    fn test_keys_are_not_escaped() {
        let wire = WireValue::from_json(json!({"value": 1, "name": ":n"}));
        let text = wire.to_json_text().unwrap();
        assert_eq!(text, r#"{"name":":n","value":1}"#);
    }

    #[test]
    fn test_unprefixed_string_is_token() {
        let wire = WireValue::from_json_text(r#"["a#b?c", ":text", null, true, 2.5]"#).unwrap();
        assert_eq!(
            wire,
            WireValue::Array(vec![
                WireValue::Token("a#b?c".into()),
                WireValue::Literal("text".into()),
                WireValue::Null,
                WireValue::Bool(true),
                WireValue::Number(Number::from_f64(2.5).unwrap()),
            ])
        );
    }

    #[test]
    fn test_malformed_text() {
        assert!(matches!(
            WireValue::from_json_text("{not json"),
            Err(MarshalError::Encoding(_))
        ));
    }

    #[test]
    fn test_value_accessors() {
        let value = Value::object([("value", Value::from(1)), ("name", Value::from("pong"))]);

        assert_eq!(value.get("value").and_then(Value::as_i64), Some(1));
        assert_eq!(value.get("name").and_then(Value::as_str), Some("pong"));
        assert!(value.get("missing").is_none());
        assert!(Value::from(f64::NAN).is_null());
    }

    #[test]
    fn test_error_value_from_error() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let captured = ErrorValue::from_error(&io);
        assert_eq!(captured.message, "disk on fire");
        assert_eq!(captured.stack, None);
    }
}
