//! Navigation helpers for optionally-present nested JSON
//!
//! A missing key, or a value of the wrong type, at any depth yields "nothing
//! to visit" rather than an error.

use serde_json::{Map, Value};

/// Follow `keys` through nested objects.
pub fn descend<'v>(map: &'v mut Map<String, Value>, keys: &[&str]) -> Option<&'v mut Map<String, Value>> {
    keys.iter()
        .try_fold(map, |current, key| current.get_mut(*key).and_then(Value::as_object_mut))
}

/// Iterate the object elements of an optional array value, skipping anything
/// that is not an object.
pub fn objects_in(value: Option<&mut Value>) -> impl Iterator<Item = &mut Map<String, Value>> {
    value
        .and_then(Value::as_array_mut)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object_mut)
}
