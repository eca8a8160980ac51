//! Conversion between [`Value`] and [`WireValue`].
//!
//! Encoding promotes every reference to a token and marks every string as
//! a literal. Decoding resolves every token back to a reference. The
//! token table is reached through [`TokenResolver`], so the walk itself
//! holds no state.

use std::collections::BTreeMap;

use ocap_marshal_core::{
    ErrorValue, MarshalError, Reference, Result, Value, WireValue, MAX_NESTING_DEPTH,
};

/// Token table operations used by the codec.
pub trait TokenResolver {
    /// Token for a reference, minted on first use.
    fn promote(&self, reference: &Reference) -> Result<String>;

    /// Reference for a token, proxied on first sight.
    fn resolve(&self, token: &str) -> Result<Reference>;
}

/// Replace references with tokens.
///
/// Fails with [`MarshalError::Encoding`] if arrays and objects nest deeper
/// than [`MAX_NESTING_DEPTH`].
pub fn encode_value<R>(value: &Value, resolver: &R) -> Result<WireValue>
where
    R: TokenResolver + ?Sized,
{
    encode_nested(value, resolver, 0)
}

fn encode_nested<R>(value: &Value, resolver: &R, depth: usize) -> Result<WireValue>
where
    R: TokenResolver + ?Sized,
{
    if depth >= MAX_NESTING_DEPTH
        && matches!(value, Value::Array(_) | Value::Object(_) | Value::Error(_))
    {
        return Err(MarshalError::Encoding(format!(
            "message nested deeper than {MAX_NESTING_DEPTH} levels"
        )));
    }

    Ok(match value {
        Value::Null => WireValue::Null,
        Value::Bool(b) => WireValue::Bool(*b),
        Value::Number(n) => WireValue::Number(n.clone()),
        Value::String(s) => WireValue::Literal(s.clone()),
        Value::Array(items) => WireValue::Array(
            items
                .iter()
                .map(|item| encode_nested(item, resolver, depth + 1))
                .collect::<Result<_>>()?,
        ),
        Value::Object(map) => WireValue::Map(
            map.iter()
                .map(|(k, v)| encode_nested(v, resolver, depth + 1).map(|w| (k.clone(), w)))
                .collect::<Result<_>>()?,
        ),
        Value::Ref(reference) => WireValue::Token(resolver.promote(reference)?),
        Value::Error(error) => encode_error(error),
    })
}

fn encode_error(error: &ErrorValue) -> WireValue {
    let mut record = BTreeMap::new();
    record.insert(
        "message".to_string(),
        WireValue::Literal(error.message.clone()),
    );
    if let Some(stack) = &error.stack {
        record.insert("stack".to_string(), WireValue::Literal(stack.clone()));
    }
    WireValue::Map(record)
}

/// Replace tokens with references.
///
/// Flattened errors come back as plain objects.
pub fn decode_value<R>(wire: WireValue, resolver: &R) -> Result<Value>
where
    R: TokenResolver + ?Sized,
{
    Ok(match wire {
        WireValue::Null => Value::Null,
        WireValue::Bool(b) => Value::Bool(b),
        WireValue::Number(n) => Value::Number(n),
        WireValue::Literal(s) => Value::String(s),
        WireValue::Token(token) => Value::Ref(resolver.resolve(&token)?),
        WireValue::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| decode_value(item, resolver))
                .collect::<Result<_>>()?,
        ),
        WireValue::Map(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| decode_value(v, resolver).map(|value| (k, value)))
                .collect::<Result<_>>()?,
        ),
    })
}
