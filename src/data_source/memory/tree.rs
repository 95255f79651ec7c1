// src/data_source/memory/tree.rs

//! Path operations over a `serde_json::Value` tree.
//!
//! `Null` and empty objects are never stored: writing `Null` removes a key,
//! and parents left empty by a removal are removed with it.

use serde_json::{Map, Value};

use crate::DataPath;

/// Value at `path`, or `None` when nothing is stored there.
pub(super) fn get<'a>(root: &'a Value, path: &DataPath) -> Option<&'a Value> {
    // ---
    let mut node = root;
    for segment in path.segments() {
        node = node.as_object()?.get(segment)?;
    }
    match node {
        Value::Null => None,
        other => Some(other),
    }
}

/// Replace the value at `path`.
pub(super) fn set(root: &mut Value, path: &DataPath, value: Value) {
    // ---
    let segments: Vec<&str> = path.segments().collect();
    set_at(root, &segments, value);
}

fn set_at(node: &mut Value, segments: &[&str], value: Value) {
    // ---
    let Some((head, rest)) = segments.split_first() else {
        *node = if is_empty(&value) { Value::Null } else { value };
        return;
    };

    if !node.is_object() {
        if value.is_null() {
            return;
        }
        *node = Value::Object(Map::new());
    }

    let Value::Object(map) = node else {
        return;
    };

    let child = map.entry(head.to_string()).or_insert(Value::Null);
    set_at(child, rest, value);
    let remove = is_empty(child);

    if remove {
        map.remove(*head);
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
