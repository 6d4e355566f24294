//! Read-only reference data for the claim form.

use axum::{Json, Router, extract::State, routing::get};

use crate::{AppState, error::ApiError, middleware::AuthCaller};
use claimflow_core::cost_type::CostType;
use claimflow_core::workflow::{REJECTION_NOTES, RejectionNote};

/// Creates the catalog routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cost-types", get(list_cost_types))
        .route("/rejection-notes", get(list_rejection_notes))
}

/// GET /cost-types - Cost types employees can choose.
async fn list_cost_types(
    State(state): State<AppState>,
    _caller: AuthCaller,
) -> Result<Json<Vec<CostType>>, ApiError> {
    Ok(Json(state.expenses.catalog().list_active().await?))
}

/// GET /rejection-notes - Canned rejection reasons.
async fn list_rejection_notes(_caller: AuthCaller) -> Json<[RejectionNote; 4]> {
    Json(REJECTION_NOTES)
}
