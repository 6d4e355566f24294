//! One export run, end to end.
//!
//! ```text
//! approved claims ──► booking rows ──► booking CSV ──┐
//!        │                                           ├─► upload both ──► approved → exported
//!        └──────────► transfers ────► payment XML ───┘
//! ```
//!
//! Nothing changes state unless both artifacts are stored.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Duration, SubsecRound, Utc};
use claimflow_shared::ExpenseId;
use claimflow_shared::config::OrganizationConfig;
use serde::Serialize;
use tokio::sync::Mutex;

use super::booking::{BookingRow, render_booking_file};
use super::documents::{self, DocumentKind, Document, ExportRunSummary, document_path, run_id};
use super::error::{ExportError, FailedArtifact};
use super::payment::{PaymentBatch, Transfer};
use crate::cost_type::CostTypeCatalog;
use crate::expense::{Expense, ExpenseFilter, ExpenseStore, StoreError};
use crate::journal::{JournalRepository, diff};
use crate::storage::BlobStore;
use crate::workflow::{Actor, ExpenseStateMachine, StatusText};

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRun {
    /// Run id, also the artifact file name.
    pub run_id: String,
    /// Written to `status.export_date` of every exported claim.
    pub export_date: DateTime<Utc>,
    /// Blob path of the booking file.
    pub booking_file: String,
    /// Blob path of the payment file.
    pub payment_file: String,
    /// Claims moved to `exported`.
    pub exported: Vec<ExpenseId>,
    /// Claims in the files that changed state before commit.
    pub skipped: Vec<ExpenseId>,
}

/// Batches approved claims into the booking and payment files.
#[derive(Clone)]
pub struct ExportPipeline {
    store: Arc<dyn ExpenseStore>,
    catalog: CostTypeCatalog,
    blobs: Arc<dyn BlobStore>,
    journal: Arc<dyn JournalRepository>,
    organization: OrganizationConfig,
    running: Arc<Mutex<()>>,
}

impl ExportPipeline {
    /// Create a new export pipeline.
    #[must_use]
    pub fn new(
        store: Arc<dyn ExpenseStore>,
        catalog: CostTypeCatalog,
        blobs: Arc<dyn BlobStore>,
        journal: Arc<dyn JournalRepository>,
        organization: OrganizationConfig,
    ) -> Self {
        Self {
            store,
            catalog,
            blobs,
            journal,
            organization,
            running: Arc::new(Mutex::new(())),
        }
    }

    /// Exports every approved claim.
    ///
    /// # Errors
    ///
    /// - `NothingToExport` when no claim is approved
    /// - `AlreadyRunning` while another run of this pipeline is in progress
    /// - `ArtifactUpload` when either file could not be stored; no claim
    ///   changes state
    pub async fn run(&self) -> Result<ExportRun, ExportError> {
        let _guard = self
            .running
            .try_lock()
            .map_err(|_| ExportError::AlreadyRunning)?;

        let approved = self
            .store
            .list(&ExpenseFilter {
                statuses: vec![StatusText::Approved],
                ..ExpenseFilter::default()
            })
            .await?;
        if approved.is_empty() {
            tracing::info!("No approved expenses, nothing to export");
            return Err(ExportError::NothingToExport);
        }

        let run_time = self.free_run_time(Utc::now().trunc_subsecs(0)).await?;
        let run_id = run_id(run_time);
        let local = run_time.with_timezone(&self.organization.timezone);

        let mut rows = Vec::with_capacity(approved.len());
        for expense in &approved {
            let ledger_account = self.ledger_account(expense).await;
            rows.push(BookingRow::new(
                expense,
                ledger_account,
                &local,
                &self.organization.booking,
            ));
        }
        let booking = render_booking_file(&rows)?;

        let batch = PaymentBatch {
            message_id: format!("{}/{run_id}", self.organization.message_id_prefix),
            created: local,
            organization: &self.organization,
            transfers: approved.iter().map(Transfer::new).collect(),
        };
        let payment = batch.render()?;

        let (booking_file, payment_file) = self.upload(&run_id, booking, payment).await?;
        let (exported, skipped) = self.commit(&approved, run_time).await?;

        tracing::info!(
            run_id = %run_id,
            exported = exported.len(),
            skipped = skipped.len(),
            control_sum = %batch.control_sum(),
            "Export run completed"
        );
        Ok(ExportRun {
            run_id,
            export_date: run_time,
            booking_file,
            payment_file,
            exported,
            skipped,
        })
    }

    /// Reads one artifact of a past run.
    ///
    /// # Errors
    ///
    /// See [`documents::fetch`].
    pub async fn document(&self, run_id: &str, kind: DocumentKind) -> Result<Document, ExportError> {
        documents::fetch(self.blobs.as_ref(), run_id, kind, self.organization.timezone).await
    }

    /// Lists past runs, newest first.
    ///
    /// # Errors
    ///
    /// Storage failures.
    pub async fn runs(&self) -> Result<Vec<ExportRunSummary>, ExportError> {
        documents::list(self.blobs.as_ref()).await
    }

    /// First whole second from `start` on whose run id has no stored artifacts.
    async fn free_run_time(&self, start: DateTime<Utc>) -> Result<DateTime<Utc>, ExportError> {
        let tz = self.organization.timezone;
        let mut run_time = start;
        while documents::run_exists(self.blobs.as_ref(), &run_id(run_time), tz).await? {
            tracing::debug!(run_id = %run_id(run_time), "Run id taken, moving to the next second");
            run_time += Duration::seconds(1);
        }
        Ok(run_time)
    }

    async fn ledger_account(&self, expense: &Expense) -> String {
        match self.catalog.ledger_account(&expense.cost_type).await {
            Ok(account) => account,
            Err(err) => {
                tracing::warn!(
                    expense_id = %expense.id,
                    cost_type = %expense.cost_type,
                    error = %err,
                    "Ledger account not resolved, booking on cost type id"
                );
                expense.cost_type_id().to_string()
            }
        }
    }

    /// Stores both artifacts, or neither.
    async fn upload(
        &self,
        run_id: &str,
        booking: Vec<u8>,
        payment: Vec<u8>,
    ) -> Result<(String, String), ExportError> {
        let tz = self.organization.timezone;
        let booking_path = document_path(DocumentKind::BookingFile, run_id, tz)?;
        let payment_path = document_path(DocumentKind::PaymentFile, run_id, tz)?;

        let booking_result = self
            .blobs
            .put(
                &booking_path,
                Bytes::from(booking),
                DocumentKind::BookingFile.content_type(),
            )
            .await;
        let payment_result = self
            .blobs
            .put(
                &payment_path,
                Bytes::from(payment),
                DocumentKind::PaymentFile.content_type(),
            )
            .await;

        let (failed, orphan) = match (&booking_result, &payment_result) {
            (Ok(()), Ok(())) => return Ok((booking_path, payment_path)),
            (Err(_), Ok(())) => (FailedArtifact::Booking, Some(&payment_path)),
            (Ok(()), Err(_)) => (FailedArtifact::Payment, Some(&booking_path)),
            (Err(_), Err(_)) => (FailedArtifact::Both, None),
        };
        for err in [booking_result.err(), payment_result.err()].into_iter().flatten() {
            tracing::error!(run_id, error = %err, "Export artifact upload failed");
        }

        if let Some(path) = orphan
            && let Err(err) = self.blobs.delete(path).await
        {
            tracing::warn!(path = %path, error = %err, "Could not remove orphaned export artifact");
        }
        Err(ExportError::ArtifactUpload { failed })
    }

    /// Moves each claim to `exported` in its own transaction.
    async fn commit(
        &self,
        approved: &[Expense],
        run_time: DateTime<Utc>,
    ) -> Result<(Vec<ExpenseId>, Vec<ExpenseId>), ExportError> {
        let system = Actor::system();
        let mut exported = Vec::with_capacity(approved.len());
        let mut skipped = Vec::new();

        for expense in approved {
            let tx = match self.store.begin(expense.id).await {
                Ok(tx) => tx,
                Err(StoreError::NotFound(id)) => {
                    tracing::warn!(expense_id = %id, "Exported expense disappeared before commit");
                    skipped.push(id);
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            let current = tx.current().clone();
            let next = match ExpenseStateMachine::mark_exported(&current, run_time) {
                Ok(next) => next,
                Err(err) => {
                    tracing::warn!(
                        expense_id = %current.id,
                        status = %current.status.text,
                        error = %err,
                        "Expense changed during export, not marked exported"
                    );
                    skipped.push(current.id);
                    continue;
                }
            };

            let entry = diff(Some(&current), &next, &system.email, Utc::now())?;
            tx.commit(next).await?;
            self.journal.append(entry).await?;
            exported.push(current.id);
        }
        Ok((exported, skipped))
    }
}
