//! Schema-free traversal of decoded JSON documents.

use serde_json::{Map, Value};

/// Calls `visit` once for every object node in `value`, parent before
/// children, in document order.
///
/// Arrays are descended into; scalars are leaves. Decoded JSON is always a
/// finite tree, so no cycle tracking is needed.
pub fn walk<'a, F>(value: &'a Value, visit: &mut F)
where
    F: FnMut(&'a Map<String, Value>),
{
    match value {
        Value::Object(map) => {
            visit(map);
            for child in map.values() {
                walk(child, visit);
            }
        }
        Value::Array(items) => {
            for child in items {
                walk(child, visit);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
    }
}
