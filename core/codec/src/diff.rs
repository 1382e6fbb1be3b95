//! Shallow field-level diffs between JSON snapshots.
//!
//! The diff compares only top-level fields: a changed nested structure is
//! captured by replacing the whole field value, never by recursing into it.
//! Deletion is encoded as a dedicated tombstone variant, so a field whose
//! value is legitimately `null` survives a diff round-trip intact.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use ludosafe_common::{Error, Result};

/// A single change to a top-level field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldChange {
    /// Set or replace the field with this value.
    Set(Value),
    /// Remove the field. Distinct from `Set(Value::Null)`.
    Deleted,
}

/// Shallow diff between two JSON objects, keyed by field name.
///
/// Serializes as a plain JSON object, e.g.
/// `{"items": {"set": [1, 2, 3, 4]}, "retired": "deleted"}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diff(BTreeMap<String, FieldChange>);

impl Diff {
    /// Whether the diff contains no changes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of changed fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over the changes in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldChange)> {
        self.0.iter()
    }

    /// Look up the change recorded for a field.
    pub fn get(&self, field: &str) -> Option<&FieldChange> {
        self.0.get(field)
    }
}

/// Compute the shallow diff that turns `old` into `new`.
///
/// A field of `new` that is absent from `old` or holds a different value is
/// recorded as [`FieldChange::Set`]; a field of `old` absent from `new` is
/// recorded as [`FieldChange::Deleted`]. Comparison is per-field value
/// equality, so an in-place-identical nested structure produces no entry.
///
/// # Errors
/// - Returns [`Error::InvalidInput`] if either argument is not a JSON
///   object
pub fn compute_diff(old: &Value, new: &Value) -> Result<Diff> {
    let old = as_object(old)?;
    let new = as_object(new)?;

    let mut changes = BTreeMap::new();

    for (field, value) in new {
        if old.get(field) != Some(value) {
            changes.insert(field.clone(), FieldChange::Set(value.clone()));
        }
    }

    for field in old.keys() {
        if !new.contains_key(field) {
            changes.insert(field.clone(), FieldChange::Deleted);
        }
    }

    Ok(Diff(changes))
}

/// Apply a diff to `old`, producing the updated snapshot.
///
/// Starts from a copy of `old`, then sets or deletes fields per entry.
/// Round-trip: `apply_diff(a, &compute_diff(a, b)?)` equals `b`.
///
/// # Errors
/// - Returns [`Error::InvalidInput`] if `old` is not a JSON object
pub fn apply_diff(old: &Value, diff: &Diff) -> Result<Value> {
    let mut result = as_object(old)?.clone();

    for (field, change) in &diff.0 {
        match change {
            FieldChange::Set(value) => {
                result.insert(field.clone(), value.clone());
            }
            FieldChange::Deleted => {
                result.remove(field);
            }
        }
    }

    Ok(Value::Object(result))
}

fn as_object(value: &Value) -> Result<&Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| Error::InvalidInput("Diff targets must be JSON objects".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_compute_diff_set_and_delete() {
        let old = json!({"a": 1, "b": 2, "c": 3});
        let new = json!({"a": 1, "b": 3, "d": 4});

        let diff = compute_diff(&old, &new).unwrap();

        assert_eq!(diff.len(), 3);
        assert_eq!(diff.get("b"), Some(&FieldChange::Set(json!(3))));
        assert_eq!(diff.get("c"), Some(&FieldChange::Deleted));
        assert_eq!(diff.get("d"), Some(&FieldChange::Set(json!(4))));
        assert_eq!(diff.get("a"), None);
    }

    #[test]
    fn test_whole_array_replacement() {
        let old = json!({"name": "A", "items": [1, 2, 3]});
        let new = json!({"name": "A", "items": [1, 2, 3, 4]});

        let diff = compute_diff(&old, &new).unwrap();

        // The array is replaced wholesale, not diffed element by element.
        assert_eq!(diff.len(), 1);
        assert_eq!(
            diff.get("items"),
            Some(&FieldChange::Set(json!([1, 2, 3, 4])))
        );

        let restored = apply_diff(&old, &diff).unwrap();
        assert_eq!(restored, new);
    }

    #[test]
    fn test_null_value_is_not_a_tombstone() {
        let old = json!({"a": 1, "b": 2});
        let new = json!({"a": null});

        let diff = compute_diff(&old, &new).unwrap();

        assert_eq!(diff.get("a"), Some(&FieldChange::Set(Value::Null)));
        assert_eq!(diff.get("b"), Some(&FieldChange::Deleted));

        let restored = apply_diff(&old, &diff).unwrap();
        assert_eq!(restored, new);
        // The null field must still be present after the round-trip.
        assert!(restored.as_object().unwrap().contains_key("a"));
    }

    #[test]
    fn test_identical_objects_give_empty_diff() {
        let value = json!({"a": 1, "nested": {"x": [1, 2]}});

        let diff = compute_diff(&value, &value).unwrap();

        assert!(diff.is_empty());
        assert_eq!(apply_diff(&value, &diff).unwrap(), value);
    }

    #[test]
    fn test_non_object_arguments_rejected() {
        let obj = json!({});

        assert!(compute_diff(&json!([1, 2]), &obj).is_err());
        assert!(compute_diff(&obj, &json!("text")).is_err());
        assert!(apply_diff(&json!(42), &Diff::default()).is_err());
    }

    #[test]
    fn test_diff_serialized_form() {
        let old = json!({"gone": 1});
        let new = json!({"items": [1, 2]});

        let diff = compute_diff(&old, &new).unwrap();
        let encoded = serde_json::to_value(&diff).unwrap();

        assert_eq!(
            encoded,
            json!({"gone": "deleted", "items": {"set": [1, 2]}})
        );

        let decoded: Diff = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, diff);
    }

    fn json_scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            "[a-z0-9 ]{0,12}".prop_map(Value::from),
            prop::collection::vec(any::<i32>(), 0..4).prop_map(Value::from),
        ]
    }

    fn json_object() -> impl Strategy<Value = Value> {
        prop::collection::btree_map("[a-f]{1,4}", json_scalar(), 0..8).prop_map(|map| {
            Value::Object(map.into_iter().collect())
        })
    }

    proptest! {
        #[test]
        fn prop_diff_roundtrip(old in json_object(), new in json_object()) {
            let diff = compute_diff(&old, &new).unwrap();
            let restored = apply_diff(&old, &diff).unwrap();
            prop_assert_eq!(restored, new);
        }

        #[test]
        fn prop_diff_survives_json_encoding(old in json_object(), new in json_object()) {
            let diff = compute_diff(&old, &new).unwrap();
            let encoded = serde_json::to_vec(&diff).unwrap();
            let decoded: Diff = serde_json::from_slice(&encoded).unwrap();
            prop_assert_eq!(apply_diff(&old, &decoded).unwrap(), new);
        }
    }
}
