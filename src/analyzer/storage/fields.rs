//! Best-effort accessors over semi-structured Kubernetes documents.
//!
//! Longhorn CRDs arrive as untyped JSON. Every accessor here walks a path of
//! field names and returns `None` when an intermediate node is missing or a
//! value has the wrong shape, so callers never have to deal with errors for
//! malformed records.

use serde_json::{Map, Value};

/// Walk `path` from `doc` and return the value at the end, if every step exists.
pub fn lookup<'a>(doc: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(doc, |node, key| node.as_object()?.get(*key))
}

/// Borrow a string at `path`.
pub fn nested_str<'a>(doc: &'a Value, path: &[&str]) -> Option<&'a str> {
    lookup(doc, path)?.as_str()
}

/// Owned string at `path`, empty when absent or not a string.
pub fn nested_string(doc: &Value, path: &[&str]) -> String {
    nested_str(doc, path).unwrap_or_default().to_string()
}

/// Integer at `path`. Floats with no fractional part are accepted.
pub fn nested_i64(doc: &Value, path: &[&str]) -> Option<i64> {
    let value = lookup(doc, path)?;
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.is_finite())
            .map(|f| f as i64)
    })
}

/// Numeric value at `path`, normalised to `f64`.
///
/// Accepts JSON floats, JSON integers and numeric strings. Anything else is
/// treated as absent.
pub fn nested_f64(doc: &Value, path: &[&str]) -> Option<f64> {
    match lookup(doc, path)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// List of strings at `path`. Non-string elements are dropped.
pub fn nested_string_slice(doc: &Value, path: &[&str]) -> Option<Vec<String>> {
    let items = lookup(doc, path)?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
    )
}

/// Object at `path`.
pub fn nested_map<'a>(doc: &'a Value, path: &[&str]) -> Option<&'a Map<String, Value>> {
    lookup(doc, path)?.as_object()
}

/// Array at `path`.
pub fn nested_slice<'a>(doc: &'a Value, path: &[&str]) -> Option<&'a Vec<Value>> {
    lookup(doc, path)?.as_array()
}

/// `metadata.name` of a Kubernetes object, empty when absent.
pub fn object_name(doc: &Value) -> String {
    nested_string(doc, &["metadata", "name"])
}
