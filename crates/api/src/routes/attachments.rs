//! Receipt upload and download routes.

use axum::{
    Extension, Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::info;

use crate::{AppState, error::ApiError, middleware::AuthCaller};
use claimflow_core::workflow::Role;
use claimflow_shared::ExpenseId;

/// Routes for the claim owner: list, read, upload and delete.
pub fn owner_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/expenses/{id}/attachments", get(list_attachments))
        .route(
            "/expenses/{id}/attachments/{name}",
            get(get_attachment)
                .put(upload_attachment)
                .delete(delete_attachment),
        )
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
}

/// Routes for approvers: list and read.
pub fn viewer_routes() -> Router<AppState> {
    Router::new()
        .route("/expenses/{id}/attachments", get(list_attachments))
        .route("/expenses/{id}/attachments/{name}", get(get_attachment))
}

/// Response for a stored attachment.
#[derive(Debug, Serialize)]
pub struct StoredAttachment {
    /// Name the attachment was stored under.
    pub name: String,
}

/// GET /expenses/{id}/attachments - Attachment names.
async fn list_attachments(
    State(state): State<AppState>,
    Extension(role): Extension<Role>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<ExpenseId>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.expenses.list_attachments(&caller, role, id).await?))
}

/// GET /expenses/{id}/attachments/{name} - Attachment contents.
async fn get_attachment(
    State(state): State<AppState>,
    Extension(role): Extension<Role>,
    AuthCaller(caller): AuthCaller,
    Path((id, name)): Path<(ExpenseId, String)>,
) -> Result<Response, ApiError> {
    let attachment = state
        .expenses
        .get_attachment(&caller, role, id, &name)
        .await?;
    Ok((
        [(header::CONTENT_TYPE, attachment.content_type)],
        attachment.bytes,
    )
        .into_response())
}

/// PUT /expenses/{id}/attachments/{name} - Upload a receipt.
async fn upload_attachment(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path((id, name)): Path<(ExpenseId, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<StoredAttachment>), ApiError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::bad_request("Content-Type header is required"))?;

    let size = body.len();
    let name = state
        .expenses
        .add_attachment(&caller, id, &name, body, content_type)
        .await?;

    info!(expense_id = %id, name = %name, size, "Attachment uploaded");
    Ok((StatusCode::CREATED, Json(StoredAttachment { name })))
}

/// DELETE /expenses/{id}/attachments/{name} - Remove a receipt.
async fn delete_attachment(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path((id, name)): Path<(ExpenseId, String)>,
) -> Result<StatusCode, ApiError> {
    state.expenses.delete_attachment(&caller, id, &name).await?;
    info!(expense_id = %id, name = %name, "Attachment deleted");
    Ok(StatusCode::NO_CONTENT)
}
