//! Structural diff between expense snapshots.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use claimflow_shared::{ExpenseId, JournalEntryId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::JournalError;
use crate::expense::Expense;

/// One changed attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeChange {
    /// Top-level field, or `field.sub` for nested objects.
    pub field: String,
    /// Value before the change; absent on creation.
    pub old: Option<Value>,
    /// Value after the change; absent when the attribute was removed.
    pub new: Option<Value>,
}

/// Immutable record of one committed mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Entry id.
    pub id: JournalEntryId,
    /// The changed expense.
    pub expense_id: ExpenseId,
    /// Commit time.
    pub time: DateTime<Utc>,
    /// Email of the caller, or `system`.
    pub user: String,
    /// What changed.
    pub attributes_changed: Vec<AttributeChange>,
}

/// Diffs `old` against `new`; `old == None` means `new` was just created.
///
/// Object-valued fields expand one level into `field.sub` rows. On creation
/// the HR record under `employee.afas_data` is left out.
pub fn diff(
    old: Option<&Expense>,
    new: &Expense,
    user: &str,
    time: DateTime<Utc>,
) -> Result<AuditEntry, JournalError> {
    let before = match old {
        Some(expense) => as_object(serde_json::to_value(expense)?),
        None => Map::new(),
    };
    let after = as_object(serde_json::to_value(new)?);
    let creating = old.is_none();

    let mut changes = Vec::new();
    let keys: BTreeSet<&String> = before.keys().chain(after.keys()).collect();
    for key in keys {
        let old_value = before.get(key);
        let new_value = after.get(key);
        if old_value == new_value {
            continue;
        }

        match (old_value, new_value) {
            (None | Some(Value::Object(_)), None | Some(Value::Object(_))) => expand(
                key,
                old_value.and_then(Value::as_object),
                new_value.and_then(Value::as_object),
                creating,
                &mut changes,
            ),
            _ => changes.push(AttributeChange {
                field: key.clone(),
                old: old_value.cloned(),
                new: new_value.cloned(),
            }),
        }
    }

    Ok(AuditEntry {
        id: JournalEntryId::new(),
        expense_id: new.id,
        time,
        user: user.to_string(),
        attributes_changed: changes,
    })
}

fn expand(
    field: &str,
    before: Option<&Map<String, Value>>,
    after: Option<&Map<String, Value>>,
    creating: bool,
    changes: &mut Vec<AttributeChange>,
) {
    let empty = Map::new();
    let before = before.unwrap_or(&empty);
    let after = after.unwrap_or(&empty);

    let keys: BTreeSet<&String> = before.keys().chain(after.keys()).collect();
    for key in keys {
        if creating && field == "employee" && key == "afas_data" {
            continue;
        }
        let old_value = before.get(key);
        let new_value = after.get(key);
        if old_value != new_value {
            changes.push(AttributeChange {
                field: format!("{field}.{key}"),
                old: old_value.cloned(),
                new: new_value.cloned(),
            });
        }
    }
}

fn as_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
