//! Request body canonicalization for key derivation.

use serde_json::{Map, Value};

use crate::http::Method;

/// Returns the key-relevant form of a request body, or `None` when the body
/// does not participate in the key.
///
/// Only POST bodies on URLs whose params are not ignored count. A body that
/// parses as JSON is re-serialized compactly with object keys sorted at every
/// depth and numbers written exactly as sent; anything else is used
/// verbatim. A missing body counts as empty.
///
/// # Examples
///
/// ```
/// use replay_cache::{canonicalize_body, http::Method};
///
/// let a = canonicalize_body(Some(r#"{"b": 2, "a": {"d": 1, "c": 0}}"#), &Method::Post, false);
/// assert_eq!(a.as_deref(), Some(r#"{"a":{"c":0,"d":1},"b":2}"#));
///
/// assert_eq!(canonicalize_body(Some("x=1"), &Method::Get, false), None);
/// assert_eq!(canonicalize_body(Some("x=1"), &Method::Post, true), None);
/// ```
pub fn canonicalize_body(body: Option<&str>, method: &Method, ignore_params: bool) -> Option<String> {
    if !method.carries_key_body() || ignore_params {
        return None;
    }
    let raw = body.unwrap_or_default();
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => Some(sort_keys(value).to_string()),
        Err(_) => Some(raw.to_owned()),
    }
}

// serde_json's map order depends on its `preserve_order` feature, so sort explicitly.
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = Map::with_capacity(entries.len());
            for (k, v) in entries {
                sorted.insert(k, sort_keys(v));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}
