//! Raw structural diff over JSON trees.

use serde_json::{Map, Value};
use tracing::debug;

use super::{Difference, PathSegment};
use crate::contract::ComponentContract;
use crate::error::Result;

/// Fields that change on every build and carry no structural meaning.
const VOLATILE_META: [&str; 2] = ["generatedAt", "hash"];

/// Computes the ordered elementary differences between `before` and `after`.
///
/// Objects are compared by key: keys of `before` in order (recursing or
/// emitting `REMOVE`), then keys only in `after` (`ADD`). Arrays are compared
/// by index. Any other mismatch, including a change of JSON type, is a
/// `CHANGE`.
#[must_use]
pub fn compute_diff(before: &Value, after: &Value) -> Vec<Difference> {
    let mut out = Vec::new();
    let mut path = Vec::new();
    walk(before, after, &mut path, &mut out);
    out
}

fn walk(before: &Value, after: &Value, path: &mut Vec<PathSegment>, out: &mut Vec<Difference>) {
    match (before, after) {
        (Value::Object(old), Value::Object(new)) => walk_objects(old, new, path, out),
        (Value::Array(old), Value::Array(new)) => {
            for index in 0..old.len().max(new.len()) {
                path.push(PathSegment::Index(index));
                match (old.get(index), new.get(index)) {
                    (Some(o), Some(n)) => walk(o, n, path, out),
                    (Some(o), None) => out.push(Difference::remove(path.clone(), o.clone())),
                    (None, Some(n)) => out.push(Difference::add(path.clone(), n.clone())),
                    (None, None) => {}
                }
                path.pop();
            }
        }
        _ if before != after => {
            out.push(Difference::change(path.clone(), before.clone(), after.clone()));
        }
        _ => {}
    }
}

fn walk_objects(
    old: &Map<String, Value>,
    new: &Map<String, Value>,
    path: &mut Vec<PathSegment>,
    out: &mut Vec<Difference>,
) {
    for (key, o) in old {
        path.push(PathSegment::Key(key.clone()));
        match new.get(key) {
            Some(n) => walk(o, n, path, out),
            None => out.push(Difference::remove(path.clone(), o.clone())),
        }
        path.pop();
    }
    for (key, n) in new.iter().filter(|(k, _)| !old.contains_key(*k)) {
        path.push(PathSegment::Key(key.clone()));
        out.push(Difference::add(path.clone(), n.clone()));
        path.pop();
    }
}

/// Removes build-specific fields (`meta.generatedAt`, `meta.hash` and the
/// persisted top-level `hash`) from a serialized contract.
pub fn strip_volatile(contract: &mut Value) {
    if let Some(root) = contract.as_object_mut() {
        root.remove("hash");
        if let Some(meta) = root.get_mut("meta").and_then(Value::as_object_mut) {
            for field in VOLATILE_META {
                meta.remove(field);
            }
        }
    }
}

/// Diffs two contracts, ignoring build-specific fields.
///
/// # Errors
///
/// Returns [`crate::error::ContractError::Serialize`] if either contract
/// cannot be serialized.
pub fn diff_contracts(before: &ComponentContract, after: &ComponentContract) -> Result<Vec<Difference>> {
    let mut old = serde_json::to_value(before)?;
    let mut new = serde_json::to_value(after)?;
    strip_volatile(&mut old);
    strip_volatile(&mut new);
    let diffs = compute_diff(&old, &new);
    debug!(
        before = %before.meta.name,
        after = %after.meta.name,
        differences = diffs.len(),
        "diffed contracts"
    );
    Ok(diffs)
}
