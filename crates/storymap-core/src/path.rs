//! Slash-separated paths into a JSON document tree.
//!
//! Stores address data like `stories/{user}/graph/nodes/3`. Numeric
//! segments index into arrays; writing `null` removes; removing an array
//! element other than the last leaves a `null` hole so sibling indices stay
//! stable.

use crate::error::{Result, StoryMapError};
use serde_json::{Map, Value};

/// Splits a path into segments, ignoring leading, trailing, and doubled slashes.
/// The empty path addresses the root.
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Store path of a user's story graph.
pub fn graph_path(user: &str) -> String {
    format!("stories/{}/graph", user)
}

pub fn get_at<'a>(root: &'a Value, segments: &[&str]) -> Option<&'a Value> {
    let mut current = root;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(*segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    (!current.is_null()).then_some(current)
}

/// Writes `value` at `segments`, creating intermediate objects. Scalars in
/// the way are replaced. Writing `null` removes.
pub fn set_at(root: &mut Value, segments: &[&str], value: Value) -> Result<()> {
    if value.is_null() {
        remove_at(root, segments);
        return Ok(());
    }
    let Some((last, parents)) = segments.split_last() else {
        *root = value;
        return Ok(());
    };

    let mut current = root;
    for segment in parents {
        current = child_mut(current, segment)?;
    }
    *child_mut(current, last)? = value;
    Ok(())
}

/// Applies each `(key, value)` of `partial` beneath `segments`. Keys may be
/// relative paths themselves; `null` values remove.
pub fn update_at(root: &mut Value, segments: &[&str], partial: Map<String, Value>) -> Result<()> {
    if let Some(existing) = get_at(root, segments) {
        if !existing.is_object() && !existing.is_array() {
            return Err(StoryMapError::Store(crate::error::StoreError::NotAnObject(
                segments.join("/"),
            )));
        }
    }
    for (key, value) in partial {
        let mut child: Vec<&str> = segments.to_vec();
        child.extend(split_path(&key));
        if child.len() == segments.len() {
            return Err(StoryMapError::invalid_path(key));
        }
        set_at(root, &child, value)?;
    }
    Ok(())
}

/// Removes the value at `segments`, returning it.
pub fn remove_at(root: &mut Value, segments: &[&str]) -> Option<Value> {
    let Some((last, parents)) = segments.split_last() else {
        return Some(std::mem::replace(root, Value::Null)).filter(|v| !v.is_null());
    };

    let mut current = root;
    for segment in parents {
        current = match current {
            Value::Object(map) => map.get_mut(*segment)?,
            Value::Array(items) => items.get_mut(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    let removed = match current {
        Value::Object(map) => map.remove(*last),
        Value::Array(items) => {
            let index = last.parse::<usize>().ok()?;
            if index + 1 == items.len() {
                items.pop()
            } else if index < items.len() {
                Some(std::mem::replace(&mut items[index], Value::Null))
            } else {
                None
            }
        }
        _ => None,
    };
    removed.filter(|v| !v.is_null())
}

fn child_mut<'a>(current: &'a mut Value, segment: &str) -> Result<&'a mut Value> {
    if !current.is_object() && !current.is_array() {
        *current = Value::Object(Map::new());
    }
    match current {
        Value::Object(map) => Ok(map.entry(segment.to_string()).or_insert(Value::Null)),
        Value::Array(items) => {
            let index = segment
                .parse::<usize>()
                .map_err(|_| StoryMapError::invalid_path(segment))?;
            if index >= items.len() {
                items.resize(index + 1, Value::Null);
            }
            Ok(&mut items[index])
        }
        _ => unreachable!("replaced with an object above"),
    }
}

/// Flattens `value` into `(path, scalar)` leaves below `prefix`.
/// `null` and empty containers produce no leaves.
pub fn flatten_leaves(prefix: &[&str], value: &Value) -> Vec<(String, Value)> {
    let mut out = Vec::new();
    let mut segments: Vec<String> = prefix.iter().map(|s| s.to_string()).collect();
    collect_leaves(&mut segments, value, &mut out);
    out
}

fn collect_leaves(segments: &mut Vec<String>, value: &Value, out: &mut Vec<(String, Value)>) {
    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (key, child) in map {
                segments.push(key.clone());
                collect_leaves(segments, child, out);
                segments.pop();
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                segments.push(index.to_string());
                collect_leaves(segments, child, out);
                segments.pop();
            }
        }
        scalar => out.push((segments.join("/"), scalar.clone())),
    }
}

/// Rebuilds a tree from relative leaves, turning objects keyed `0..n`
/// (mostly dense) back into arrays.
pub fn assemble(leaves: Vec<(Vec<String>, Value)>) -> Option<Value> {
    let mut root = Value::Null;
    for (segments, value) in leaves {
        let refs: Vec<&str> = segments.iter().map(String::as_str).collect();
        if refs.is_empty() {
            root = value;
            continue;
        }
        let mut current = &mut root;
        for segment in &refs {
            if !current.is_object() {
                *current = Value::Object(Map::new());
            }
            current = match current {
                Value::Object(map) => map.entry(segment.to_string()).or_insert(Value::Null),
                _ => unreachable!("replaced with an object above"),
            };
        }
        *current = value;
    }
    let root = restore_arrays(root);
    (!root.is_null()).then_some(root)
}

fn restore_arrays(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let indices: Option<Vec<usize>> = map
                .keys()
                .map(|k| k.parse::<usize>().ok().filter(|n| n.to_string() == *k))
                .collect();
            match indices {
                Some(indices) if !indices.is_empty() => {
                    let len = indices.iter().max().map_or(0, |m| m + 1);
                    if indices.len() * 2 > len {
                        let mut items = vec![Value::Null; len];
                        for (key, child) in map {
                            if let Ok(index) = key.parse::<usize>() {
                                items[index] = restore_arrays(child);
                            }
                        }
                        return Value::Array(items);
                    }
                    Value::Object(map.into_iter().map(|(k, v)| (k, restore_arrays(v))).collect())
                }
                _ => Value::Object(map.into_iter().map(|(k, v)| (k, restore_arrays(v))).collect()),
            }
        }
        other => other,
    }
}
