//! Export runs and their booking and payment documents.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::{AppState, error::ApiError, middleware::AuthCaller};
use claimflow_core::export::{DocumentKind, ExportError};
use claimflow_core::workflow::Role;

/// Creates the document routes, mounted below `/finances`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/documents", get(list_runs).post(create_run))
        .route("/documents/{run_id}/kinds/{kind}", get(download_document))
}

// ============================================================================
// Response Types
// ============================================================================

/// A past run with download links for both documents.
#[derive(Debug, Serialize)]
pub struct RunResponse {
    /// Run id.
    pub run_id: String,
    /// Run time.
    pub created: DateTime<Utc>,
    /// Download link of the booking file.
    pub booking_file: String,
    /// Download link of the payment file.
    pub payment_file: String,
}

fn document_link(run_id: &str, kind: DocumentKind) -> String {
    format!("/api/v1/finances/documents/{run_id}/kinds/{kind}")
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /documents - Export all approved claims.
///
/// Answers 204 when nothing is approved.
async fn create_run(State(state): State<AppState>, caller: AuthCaller) -> Result<Response, ApiError> {
    let caller = caller.require(Role::Creditor)?;
    match state.exports.run().await {
        Ok(run) => {
            info!(
                run_id = %run.run_id,
                exported = run.exported.len(),
                requested_by = %caller.email,
                "Export run completed"
            );
            Ok((StatusCode::CREATED, Json(run)).into_response())
        }
        Err(ExportError::NothingToExport) => Ok(StatusCode::NO_CONTENT.into_response()),
        Err(err) => Err(err.into()),
    }
}

/// GET /documents - Past runs, newest first.
async fn list_runs(
    State(state): State<AppState>,
    caller: AuthCaller,
) -> Result<Json<Vec<RunResponse>>, ApiError> {
    caller.require(Role::Creditor)?;
    let runs = state
        .exports
        .runs()
        .await?
        .into_iter()
        .map(|run| RunResponse {
            booking_file: document_link(&run.run_id, DocumentKind::BookingFile),
            payment_file: document_link(&run.run_id, DocumentKind::PaymentFile),
            run_id: run.run_id,
            created: run.created,
        })
        .collect();
    Ok(Json(runs))
}

/// GET /documents/{run_id}/kinds/{kind} - Download one document.
async fn download_document(
    State(state): State<AppState>,
    caller: AuthCaller,
    Path((run_id, kind)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    caller.require(Role::Creditor)?;
    let kind = DocumentKind::parse(&kind)?;
    let document = state.exports.document(&run_id, kind).await?;

    Ok((
        [
            (header::CONTENT_TYPE, document.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", document.filename),
            ),
        ],
        document.bytes,
    )
        .into_response())
}
