//! Safe descent over untyped JSON trees.
//!
//! The chat wire format is a deep tree of optional, mutually exclusive
//! branches. These helpers never fail on a missing or wrong-shaped hop; they
//! return `None` (or a zero default) so decoding can treat absence as the
//! normal "not applicable" outcome.

use serde_json::Value;

/// One hop of a descent path: a map key or a sequence index.
#[derive(Debug, Clone, Copy)]
pub enum Key<'a> {
    Str(&'a str),
    Idx(usize),
}

impl<'a> From<&'a str> for Key<'a> {
    fn from(s: &'a str) -> Self {
        Key::Str(s)
    }
}

impl From<usize> for Key<'_> {
    fn from(i: usize) -> Self {
        Key::Idx(i)
    }
}

/// Walks `path` down from `root`. Total over all inputs: any missing key,
/// out-of-range index, or wrong-shaped node yields `None`.
pub fn descend<'a>(root: &'a Value, path: &[Key<'_>]) -> Option<&'a Value> {
    let mut node = root;
    for key in path {
        node = match key {
            Key::Str(k) => node.as_object()?.get(*k)?,
            Key::Idx(i) => node.as_array()?.get(*i)?,
        };
    }
    Some(node)
}

/// Descends a string-key-only path to a map node.
pub fn map_at<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut node = root;
    for key in path {
        node = node.as_object()?.get(*key)?;
    }
    node.is_object().then_some(node)
}

/// Descends a string-key-only path and reads `list_key` as an array there.
pub fn list_at<'a>(root: &'a Value, path: &[&str], list_key: &str) -> Option<&'a Vec<Value>> {
    let mut node = root;
    for key in path {
        node = node.as_object()?.get(*key)?;
    }
    node.as_object()?.get(list_key)?.as_array()
}

pub fn get_str<'a>(node: &'a Value, key: &str) -> Option<&'a str> {
    node.as_object()?.get(key)?.as_str()
}

/// String value of `key`; numbers are stringified the way the backend
/// sometimes flips between the two representations.
pub fn get_string(node: &Value, key: &str) -> Option<String> {
    match node.as_object()?.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Integer value of `key`, accepting both JSON numbers and numeric strings.
pub fn get_i64(node: &Value, key: &str) -> Option<i64> {
    match node.as_object()?.get(key)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Color fields arrive as unsigned 32-bit ARGB values; absent means 0.
pub fn get_color(node: &Value, key: &str) -> u32 {
    get_i64(node, key).map(|v| v as u32).unwrap_or(0)
}

pub fn get_bool(node: &Value, key: &str) -> bool {
    node.as_object()
        .and_then(|m| m.get(key))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

pub fn get_list<'a>(node: &'a Value, key: &str) -> Option<&'a Vec<Value>> {
    node.as_object()?.get(key)?.as_array()
}
