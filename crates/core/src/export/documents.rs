//! Naming and retrieval of stored export artifacts.
//!
//! Artifacts live at `exports/{kind}/{year}/{month}/{day}/{run_id}`, dated
//! in the organization time zone. The run id is the UTC run time as
//! `%Y%m%d%H%M%S`.

use std::fmt;

use bytes::Bytes;
use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use super::error::ExportError;
use crate::storage::{BlobStore, StorageError};

const RUN_ID_FORMAT: &str = "%Y%m%d%H%M%S";
const EXPORT_ROOT: &str = "exports";

/// The two artifacts of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Ledger booking CSV.
    BookingFile,
    /// SEPA payment XML.
    PaymentFile,
}

impl DocumentKind {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BookingFile => "booking_file",
            Self::PaymentFile => "payment_file",
        }
    }

    /// Parses a kind from its path segment.
    ///
    /// # Errors
    ///
    /// `ExportError::UnknownKind` for anything else.
    pub fn parse(s: &str) -> Result<Self, ExportError> {
        match s {
            "booking_file" => Ok(Self::BookingFile),
            "payment_file" => Ok(Self::PaymentFile),
            other => Err(ExportError::UnknownKind(other.to_string())),
        }
    }

    /// MIME type of the stored document.
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::BookingFile => "text/csv",
            Self::PaymentFile => "application/xml",
        }
    }

    /// File extension used for downloads.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::BookingFile => "csv",
            Self::PaymentFile => "xml",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored artifact ready for download.
#[derive(Debug, Clone)]
pub struct Document {
    /// File content.
    pub bytes: Bytes,
    /// MIME type.
    pub content_type: &'static str,
    /// Download file name, `{run_id}.{ext}`.
    pub filename: String,
}

/// One past export run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRunSummary {
    /// Run id.
    pub run_id: String,
    /// Run time.
    pub created: DateTime<Utc>,
}

/// Formats the run id for a run time.
#[must_use]
pub fn run_id(run_time: DateTime<Utc>) -> String {
    run_time.format(RUN_ID_FORMAT).to_string()
}

/// Parses a run id back into its run time.
///
/// # Errors
///
/// `ExportError::InvalidRunId` unless `run_id` is exactly 14 digits forming
/// a valid time.
pub fn parse_run_id(run_id: &str) -> Result<DateTime<Utc>, ExportError> {
    if run_id.len() != 14 || !run_id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ExportError::InvalidRunId(run_id.to_string()));
    }
    NaiveDateTime::parse_from_str(run_id, RUN_ID_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| ExportError::InvalidRunId(run_id.to_string()))
}

/// Blob path of one artifact of a run.
///
/// # Errors
///
/// `ExportError::InvalidRunId` for a malformed run id.
pub fn document_path(kind: DocumentKind, run_id: &str, timezone: Tz) -> Result<String, ExportError> {
    let local = parse_run_id(run_id)?.with_timezone(&timezone);
    Ok(format!(
        "{EXPORT_ROOT}/{kind}/{}/{}/{}/{run_id}",
        local.year(),
        local.month(),
        local.day()
    ))
}

/// Whether either artifact of `run_id` is already stored.
///
/// # Errors
///
/// `InvalidRunId` for a malformed id, or a storage failure other than a
/// missing blob.
pub async fn run_exists(
    blobs: &dyn BlobStore,
    run_id: &str,
    timezone: Tz,
) -> Result<bool, ExportError> {
    for kind in [DocumentKind::BookingFile, DocumentKind::PaymentFile] {
        match blobs.get(&document_path(kind, run_id, timezone)?).await {
            Ok(_) => return Ok(true),
            Err(StorageError::NotFound { .. }) => {}
            Err(err) => return Err(err.into()),
        }
    }
    Ok(false)
}

/// Reads one artifact of a past run.
///
/// # Errors
///
/// `InvalidRunId` for a malformed id, `DocumentNotFound` when the run or
/// artifact does not exist.
pub async fn fetch(
    blobs: &dyn BlobStore,
    run_id: &str,
    kind: DocumentKind,
    timezone: Tz,
) -> Result<Document, ExportError> {
    let path = document_path(kind, run_id, timezone)?;
    let blob = blobs.get(&path).await.map_err(|err| match err {
        StorageError::NotFound { .. } => ExportError::DocumentNotFound(format!("{run_id}/{kind}")),
        other => ExportError::Storage(other),
    })?;
    Ok(Document {
        bytes: blob.bytes,
        content_type: kind.content_type(),
        filename: format!("{run_id}.{}", kind.extension()),
    })
}

/// Lists past runs, newest first.
///
/// # Errors
///
/// Storage failures.
pub async fn list(blobs: &dyn BlobStore) -> Result<Vec<ExportRunSummary>, ExportError> {
    let prefix = format!("{EXPORT_ROOT}/{}", DocumentKind::BookingFile);
    let mut runs: Vec<ExportRunSummary> = blobs
        .list(&prefix)
        .await?
        .iter()
        .filter_map(|path| path.rsplit('/').next())
        .filter_map(|run_id| {
            parse_run_id(run_id).ok().map(|created| ExportRunSummary {
                run_id: run_id.to_string(),
                created,
            })
        })
        .collect();
    runs.sort_by(|a, b| b.created.cmp(&a.created));
    Ok(runs)
}
