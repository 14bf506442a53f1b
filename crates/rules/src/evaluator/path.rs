//! Dotted-path lookup into a fact object.

use serde_json::Value;

/// Resolve `path` against `facts`.
///
/// Segments address object keys; a numeric segment also indexes arrays.
/// Any missing intermediate (or an empty path) yields `None`.
pub fn lookup<'a>(facts: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }
    path.split('.').try_fold(facts, |current, key| match current {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}
