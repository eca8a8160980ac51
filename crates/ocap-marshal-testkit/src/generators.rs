//! Proptest generators for property-based testing.

use proptest::prelude::*;

use ocap_marshal_core::Value;

/// Strings that parse as tokens, in both forms.
pub fn token_like_string() -> impl Strategy<Value = String> {
    (
        "[a-z]{1,8}:(//)?[a-z0-9.]{1,12}/?",
        "[A-Za-z0-9+/]{4,24}",
        proptest::option::of("[A-Za-z0-9+/]{43}="),
    )
        .prop_map(|(domain, capability, key)| match key {
            Some(key) => format!("{domain}#{capability}?{key}"),
            None => format!("{domain}#{capability}"),
        })
}

/// Any string, biased towards the characters the wire format cares about.
pub fn tricky_string() -> impl Strategy<Value = String> {
    prop_oneof![
        any::<String>(),
        token_like_string(),
        "[:#?]{0,4}[a-z]{0,4}",
        Just(String::new()),
    ]
}

/// A scalar value.
pub fn scalar_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        // quarter steps survive a decimal round trip exactly
        (-1_000_000i32..1_000_000).prop_map(|n| Value::from(f64::from(n) / 4.0)),
        tricky_string().prop_map(Value::from),
    ]
}

/// A value tree without references or errors.
pub fn plain_value() -> impl Strategy<Value = Value> {
    scalar_value().prop_recursive(4, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-z:#?]{0,6}", inner, 0..6).prop_map(Value::Object),
        ]
    })
}

/// The same tree as plain JSON, for cross-checking with `serde_json`.
pub fn to_plain_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null | Value::Ref(_) | Value::Error(_) => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => serde_json::Value::Number(n.clone()),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Array(items) => serde_json::Value::Array(items.iter().map(to_plain_json).collect()),
        Value::Object(map) => serde_json::Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), to_plain_json(v)))
                .collect(),
        ),
    }
}
