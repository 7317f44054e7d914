//! Schema migrations for persisted shopping lists.
//!
//! Stored data is a JSON array of lists. Migrations operate on the raw
//! [`serde_json::Value`] before it is decoded into typed structs, so they can
//! handle shapes the current types no longer accept.
//!
//! # Versions
//!
//! | version | change                                              |
//! |---------|-----------------------------------------------------|
//! | 1       | initial shape, item quantity stored as `amount`     |
//! | 2       | `amount` renamed to `quantity`                      |
//!
//! Every step is idempotent and every step runs on every load, in order.
//! Data written by an older build carries no version marker, and an older
//! build may rewrite data after a newer one has stamped it, so the stored
//! version is used for diagnostics only and never to skip steps.

use crate::error::{Error, Result};
use serde_json::{Map, Value};

/// Schema version written by this build.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// Version assumed when storage has no version marker.
pub const LEGACY_SCHEMA_VERSION: u32 = 1;

/// One migration step.
pub struct Migration {
    /// Schema version this step produces.
    pub version: u32,
    pub description: &'static str,
    /// Rewrites the document in place; returns how many records it touched.
    apply: fn(&mut [Value]) -> usize,
}

impl Migration {
    pub fn apply(&self, lists: &mut [Value]) -> usize {
        (self.apply)(lists)
    }
}

/// All steps, oldest first.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 2,
        description: "default missing item arrays to empty",
        apply: fill_missing_items,
    },
    Migration {
        version: 2,
        description: "rename item field amount -> quantity",
        apply: rename_amount_to_quantity,
    },
    Migration {
        version: 2,
        description: "drop null fields so they decode as defaults",
        apply: drop_null_fields,
    },
];

/// What a [`migrate`] call did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Version found in storage (or [`LEGACY_SCHEMA_VERSION`]).
    pub from_version: u32,
    /// Version the document is now in.
    pub to_version: u32,
    /// Records rewritten, summed across steps. Zero means nothing changed.
    pub rewritten: usize,
}

impl MigrationReport {
    pub fn changed(&self) -> bool {
        self.rewritten > 0
    }
}

/// Bring a stored document up to [`CURRENT_SCHEMA_VERSION`].
///
/// # Errors
///
/// `Error::MalformedPersistedData` when the document is not an array.
pub fn migrate(doc: &mut Value, stored_version: Option<u32>) -> Result<MigrationReport> {
    let from_version = stored_version.unwrap_or(LEGACY_SCHEMA_VERSION);
    if from_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Stored schema version {} is newer than supported {}; loading anyway",
            from_version, CURRENT_SCHEMA_VERSION
        );
    }

    let lists = match doc {
        Value::Array(lists) => lists,
        other => {
            return Err(Error::MalformedPersistedData(format!(
                "expected an array of lists, found {}",
                kind_of(other)
            )))
        }
    };

    let mut rewritten = 0;
    for step in MIGRATIONS {
        let touched = step.apply(lists);
        if touched > 0 {
            debug!(
                "Migration to v{} ({}): {} records",
                step.version, step.description, touched
            );
        }
        rewritten += touched;
    }

    Ok(MigrationReport {
        from_version,
        to_version: CURRENT_SCHEMA_VERSION,
        rewritten,
    })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn items_of(list: &mut Value) -> Option<&mut Vec<Value>> {
    list.get_mut("items")?.as_array_mut()
}

fn fill_missing_items(lists: &mut [Value]) -> usize {
    let mut touched = 0;
    for list in lists.iter_mut() {
        let Some(obj) = list.as_object_mut() else {
            continue;
        };
        if obj.get("items").map_or(true, Value::is_null) {
            obj.insert("items".to_string(), Value::Array(Vec::new()));
            touched += 1;
        }
    }
    touched
}

fn rename_amount_to_quantity(lists: &mut [Value]) -> usize {
    let mut touched = 0;
    for list in lists.iter_mut() {
        let Some(items) = items_of(list) else {
            continue;
        };
        for item in items.iter_mut().filter_map(Value::as_object_mut) {
            if rename_field(item, "amount", "quantity") {
                touched += 1;
            }
        }
    }
    touched
}

/// Remove `null` values from lists and items, except `id`.
///
/// Every other field has a default, so a null left behind by a hand edit
/// or an older build decodes as blank instead of failing the whole load.
fn drop_null_fields(lists: &mut [Value]) -> usize {
    let mut touched = 0;
    for list in lists.iter_mut() {
        if let Some(obj) = list.as_object_mut() {
            if strip_nulls(obj) {
                touched += 1;
            }
        }
        let Some(items) = items_of(list) else {
            continue;
        };
        for item in items.iter_mut().filter_map(Value::as_object_mut) {
            if strip_nulls(item) {
                touched += 1;
            }
        }
    }
    touched
}

fn strip_nulls(obj: &mut Map<String, Value>) -> bool {
    let before = obj.len();
    obj.retain(|key, value| key == "id" || !value.is_null());
    obj.len() != before
}

/// Move `from` to `to` when `to` is absent (or null). Returns whether it moved.
fn rename_field(obj: &mut Map<String, Value>, from: &str, to: &str) -> bool {
    if obj.get(to).is_some_and(|v| !v.is_null()) {
        return false;
    }
    match obj.remove(from) {
        Some(value) => {
            obj.insert(to.to_string(), value);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_amount_renamed_to_quantity() {
        let mut doc = json!([
            { "id": "g1", "name": "Old", "items": [
                { "id": "i1", "amount": "5", "totalPaid": "10" }
            ]}
        ]);

        let report = migrate(&mut doc, None).unwrap();
        assert_eq!(report.from_version, 1);
        assert_eq!(report.to_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(report.rewritten, 1);

        let item = &doc[0]["items"][0];
        assert_eq!(item["quantity"], "5");
        assert!(item.get("amount").is_none());
    }

    #[test]
    fn test_migration_is_idempotent() {
        let mut doc = json!([
            { "id": "g1", "items": [ { "id": "i1", "amount": "5" } ] }
        ]);
        migrate(&mut doc, None).unwrap();
        let once = doc.clone();

        let report = migrate(&mut doc, Some(CURRENT_SCHEMA_VERSION)).unwrap();
        assert!(!report.changed());
        assert_eq!(doc, once);
    }

    #[test]
    fn test_existing_quantity_wins() {
        let mut doc = json!([
            { "id": "g1", "items": [ { "id": "i1", "amount": "5", "quantity": "7" } ] }
        ]);
        migrate(&mut doc, None).unwrap();

        let item = &doc[0]["items"][0];
        assert_eq!(item["quantity"], "7");
        assert_eq!(item["amount"], "5");
    }

    #[test]
    fn test_null_quantity_replaced_by_amount() {
        let mut doc = json!([
            { "id": "g1", "items": [ { "id": "i1", "amount": "2", "quantity": null } ] }
        ]);
        migrate(&mut doc, None).unwrap();
        assert_eq!(doc[0]["items"][0]["quantity"], "2");
    }

    #[test]
    fn test_missing_items_filled() {
        let mut doc = json!([ { "id": "g1" }, { "id": "g2", "items": null } ]);
        let report = migrate(&mut doc, None).unwrap();
        assert_eq!(report.rewritten, 2);
        assert_eq!(doc[0]["items"], json!([]));
        assert_eq!(doc[1]["items"], json!([]));
    }

    #[test]
    fn test_runs_even_when_stamped_current() {
        // An older build may have rewritten v1-shaped data after we stamped it.
        let mut doc = json!([
            { "id": "g1", "items": [ { "id": "i1", "amount": "3" } ] }
        ]);
        let report = migrate(&mut doc, Some(CURRENT_SCHEMA_VERSION)).unwrap();
        assert_eq!(report.rewritten, 1);
        assert_eq!(doc[0]["items"][0]["quantity"], "3");
    }

    #[test]
    fn test_null_fields_dropped() {
        let mut doc = json!([
            { "id": "g1", "name": null, "items": [
                { "id": "i1", "quantity": null, "totalPaid": "4" },
                { "id": "i2", "amount": null, "pricePerUnit": null }
            ]}
        ]);
        let report = migrate(&mut doc, None).unwrap();
        assert_eq!(report.rewritten, 4);

        assert!(doc[0].get("name").is_none());
        let items = &doc[0]["items"];
        assert!(items[0].get("quantity").is_none());
        assert_eq!(items[0]["totalPaid"], "4");
        assert!(items[1].get("quantity").is_none());
        assert!(items[1].get("pricePerUnit").is_none());

        let again = migrate(&mut doc, Some(CURRENT_SCHEMA_VERSION)).unwrap();
        assert!(!again.changed());
    }

    #[test]
    fn test_null_id_kept_for_decoder() {
        let mut doc = json!([ { "id": null, "items": [] } ]);
        migrate(&mut doc, None).unwrap();
        assert!(doc[0]["id"].is_null());
    }

    #[test]
    fn test_non_array_rejected() {
        let mut doc = json!({ "lists": [] });
        let err = migrate(&mut doc, None).unwrap_err();
        assert!(matches!(err, Error::MalformedPersistedData(_)));
    }

    #[test]
    fn test_non_object_entries_left_for_decoder() {
        let mut doc = json!([42, "x"]);
        let report = migrate(&mut doc, None).unwrap();
        assert_eq!(report.rewritten, 0);
    }
}
