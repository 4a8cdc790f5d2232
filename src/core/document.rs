//! Ordered JSON documents.
//!
//! `package.json` and `angular.json` are held as `serde_json::Map` values
//! (insertion ordered through the `preserve_order` feature). Only the fields
//! this crate edits get typed accessors; everything else passes through
//! untouched.

use serde_json::{Map, Value};

/// An ordered JSON object.
pub type JsonMap = Map<String, Value>;

/// Serialize a document the way npm and the Angular CLI write it:
/// two-space indentation and a trailing newline.
pub fn to_pretty_string(doc: &JsonMap) -> serde_json::Result<String> {
    let mut out = serde_json::to_string_pretty(doc)?;
    out.push('\n');
    Ok(out)
}

/// Insert `key` keeping the map's ordering conventions.
///
/// An existing key is overwritten in place. A new key goes before the first
/// key that sorts after it, or at the end, so a sorted map stays sorted and an
/// unsorted one is disturbed as little as possible.
pub fn insert_ordered(map: &mut JsonMap, key: &str, value: Value) -> Option<Value> {
    if let Some(slot) = map.get_mut(key) {
        return Some(std::mem::replace(slot, value));
    }

    let position = map.keys().position(|existing| existing.as_str() > key);
    match position {
        None => {
            map.insert(key.to_string(), value);
        }
        Some(index) => {
            let mut rebuilt = JsonMap::with_capacity(map.len() + 1);
            let mut value = Some(value);
            for (i, (k, v)) in std::mem::take(map).into_iter().enumerate() {
                if i == index {
                    if let Some(value) = value.take() {
                        rebuilt.insert(key.to_string(), value);
                    }
                }
                rebuilt.insert(k, v);
            }
            *map = rebuilt;
        }
    }

    None
}
