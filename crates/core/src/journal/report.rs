//! Flattening journal entries into report rows.

use chrono::{DateTime, SecondsFormat, Utc};
use claimflow_shared::ExpenseId;
use serde::Serialize;
use serde_json::Value;

use super::diff::AuditEntry;
use super::error::JournalError;

/// One changed attribute of one journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalRow {
    /// The changed expense.
    #[serde(rename = "Expenses_Id")]
    pub expense_id: ExpenseId,
    /// Commit time.
    #[serde(rename = "Time")]
    pub time: String,
    /// Attribute, `field: sub` for nested values.
    #[serde(rename = "Attribute")]
    pub attribute: String,
    /// Value before the change.
    #[serde(rename = "Old value")]
    pub old_value: String,
    /// Value after the change.
    #[serde(rename = "New value")]
    pub new_value: String,
    /// Who made the change.
    #[serde(rename = "User")]
    pub user: String,
}

/// Flattens entries into one row per changed attribute.
#[must_use]
pub fn journal_rows(entries: &[AuditEntry]) -> Vec<JournalRow> {
    entries
        .iter()
        .flat_map(|entry| {
            entry
                .attributes_changed
                .iter()
                .map(move |change| JournalRow {
                    expense_id: entry.expense_id,
                    time: format_time(entry.time),
                    attribute: change.field.replacen('.', ": ", 1),
                    old_value: value_text(change.old.as_ref()),
                    new_value: value_text(change.new.as_ref()),
                    user: entry.user.clone(),
                })
        })
        .collect()
}

/// Renders rows as a comma separated file with header.
///
/// # Errors
///
/// `JournalError::Render` if the CSV writer fails.
pub fn render_csv(rows: &[JournalRow]) -> Result<Vec<u8>, JournalError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| JournalError::Render(e.to_string()))?;
    }
    if rows.is_empty() {
        writer
            .write_record(["Expenses_Id", "Time", "Attribute", "Old value", "New value", "User"])
            .map_err(|e| JournalError::Render(e.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|e| JournalError::Render(e.to_string()))
}

fn format_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn value_text(value: Option<&Value>) -> String {
    let text = match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };
    text.replace(['\n', '\r'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::diff;
    use crate::testing::expense;
    use crate::workflow::StatusText;
    use chrono::TimeZone;

    #[test]
    fn test_rows_flatten_entries() {
        let before = expense(3, StatusText::ReadyForCreditor);
        let mut after = before.clone();
        after.status.text = StatusText::Approved;
        after.note = "line one\nline two".into();
        let time = Utc.with_ymd_and_hms(2024, 4, 1, 12, 0, 0).unwrap();

        let entry = diff(Some(&before), &after, "crediteuren@example.com", time).unwrap();
        let rows = journal_rows(&[entry]);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].attribute, "note");
        assert_eq!(rows[0].new_value, "line one line two");
        assert_eq!(rows[1].attribute, "status: text");
        assert_eq!(rows[1].old_value, "ready_for_creditor");
        assert_eq!(rows[1].new_value, "approved");
        assert_eq!(rows[1].time, "2024-04-01T12:00:00Z");
        assert_eq!(rows[1].user, "crediteuren@example.com");
    }

    #[test]
    fn test_render_csv_header_and_rows() {
        let rows = vec![JournalRow {
            expense_id: ExpenseId(3),
            time: "2024-04-01T12:00:00Z".into(),
            attribute: "status: text".into(),
            old_value: "ready_for_creditor".into(),
            new_value: "approved".into(),
            user: "system".into(),
        }];

        let csv = String::from_utf8(render_csv(&rows).unwrap()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("Expenses_Id,Time,Attribute,Old value,New value,User")
        );
        assert_eq!(
            lines.next(),
            Some("3,2024-04-01T12:00:00Z,status: text,ready_for_creditor,approved,system")
        );
    }

    #[test]
    fn test_render_empty_has_header() {
        let csv = String::from_utf8(render_csv(&[]).unwrap()).unwrap();
        assert_eq!(csv.trim_end(), "Expenses_Id,Time,Attribute,Old value,New value,User");
    }
}
