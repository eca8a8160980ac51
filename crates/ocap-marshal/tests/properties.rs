//! Property tests over the wire codec.

use proptest::prelude::*;

use ocap_marshal::{Domain, DomainConfig, Reference, Value};
use ocap_marshal_testkit::generators::{plain_value, to_plain_json, token_like_string};
use ocap_marshal_testkit::Recorder;

/// Strip one leading sentinel from every string in a wire JSON tree.
fn unescape(json: serde_json::Value) -> serde_json::Value {
    match json {
        serde_json::Value::String(s) => {
            serde_json::Value::String(s.strip_prefix(':').unwrap_or(&s).to_string())
        }
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.into_iter().map(unescape).collect())
        }
        serde_json::Value::Object(map) => {
            serde_json::Value::Object(map.into_iter().map(|(k, v)| (k, unescape(v))).collect())
        }
        other => other,
    }
}

fn all_strings_escaped(json: &serde_json::Value) -> bool {
    match json {
        serde_json::Value::String(s) => s.starts_with(':'),
        serde_json::Value::Array(items) => items.iter().all(all_strings_escaped),
        serde_json::Value::Object(map) => map.values().all(all_strings_escaped),
        _ => true,
    }
}

fn domain(name: &str) -> Domain {
    Domain::new(DomainConfig::named(name)).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn plain_values_round_trip(value in plain_value()) {
        let domain = domain("ocap:zero");
        let text = domain.encode(&value).unwrap();

        prop_assert_eq!(domain.decode(Some(text.as_str())).unwrap(), Some(value));
        prop_assert_eq!(domain.binding_count(), 0);
    }

    #[test]
    fn every_encoded_string_is_escaped(value in plain_value()) {
        let domain = domain("ocap:zero");
        let text = domain.encode(&value).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();

        prop_assert!(all_strings_escaped(&json));
        prop_assert_eq!(unescape(json), to_plain_json(&value));
    }

    #[test]
    fn token_lookalikes_decode_as_literals(text in token_like_string()) {
        let domain = domain("ocap:zero");
        let value = Value::object([("s", Value::from(text.clone()))]);

        let encoded = domain.encode(&value).unwrap();
        let decoded = domain.decode(Some(encoded.as_str())).unwrap().unwrap();
        prop_assert_eq!(decoded.get("s").and_then(Value::as_str), Some(text.as_str()));
        prop_assert_eq!(domain.binding_count(), 0);
    }

    #[test]
    fn promotion_is_stable(count in 1usize..8) {
        let domain = domain("ocap:zero");
        let actors: Vec<Reference> = (0..count).map(|_| Recorder::new().reference()).collect();

        let first: Vec<String> = actors.iter().map(|a| domain.local_to_remote(a).unwrap()).collect();
        let second: Vec<String> = actors.iter().map(|a| domain.local_to_remote(a).unwrap()).collect();

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(domain.binding_count(), 2 * count);
    }
}
