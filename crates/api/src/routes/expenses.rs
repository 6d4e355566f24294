//! Expense claim routes, mounted once per role.
//!
//! The same handlers serve `/employees`, `/managers`, `/creditors` and
//! `/controllers`; the role is attached to the router as an extension and
//! decides what the caller sees and may change.

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use tracing::info;

use crate::{AppState, error::ApiError, middleware::AuthCaller};
use claimflow_core::expense::{Expense, ExpenseChange, ExpenseFilter, NewExpense};
use claimflow_core::workflow::{Role, StatusText};
use claimflow_shared::ExpenseId;

use super::attachments;

/// Routes for the claimant: create, list, read, update and manage receipts.
pub fn employee_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses).post(create_expense))
        .route("/expenses/{id}", get(get_expense).put(update_expense))
        .merge(attachments::owner_routes(max_upload_bytes))
        .layer(Extension(Role::Employee))
}

/// Routes for an approving role: list, read, update and view receipts.
pub fn approver_routes(role: Role) -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses))
        .route("/expenses/{id}", get(get_expense).put(update_expense))
        .merge(attachments::viewer_routes())
        .layer(Extension(role))
}

// ============================================================================
// Request Types
// ============================================================================

/// Query parameters for listing claims.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Comma separated statuses, e.g. `draft,rejected_by_manager`.
    #[serde(default)]
    pub status: Option<String>,
}

impl ListQuery {
    fn into_filter(self) -> Result<ExpenseFilter, ApiError> {
        let mut filter = ExpenseFilter::default();
        if let Some(statuses) = self.status {
            for text in statuses.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                let status = StatusText::parse(text)
                    .ok_or_else(|| ApiError::bad_request(format!("Unknown status '{text}'")))?;
                filter.statuses.push(status);
            }
        }
        Ok(filter)
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /expenses - Claims the role works on.
async fn list_expenses(
    State(state): State<AppState>,
    Extension(role): Extension<Role>,
    AuthCaller(caller): AuthCaller,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Expense>>, ApiError> {
    let filter = query.into_filter()?;
    let expenses = state.expenses.list(&caller, role, filter).await?;
    Ok(Json(expenses))
}

/// POST /expenses - Create a draft claim.
async fn create_expense(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Json(new): Json<NewExpense>,
) -> Result<(StatusCode, Json<Expense>), ApiError> {
    let expense = state.expenses.create(&caller, new).await?;
    info!(expense_id = %expense.id, "Expense created via API");
    Ok((StatusCode::CREATED, Json(expense)))
}

/// GET /expenses/{id} - One claim.
async fn get_expense(
    State(state): State<AppState>,
    Extension(role): Extension<Role>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<ExpenseId>,
) -> Result<Json<Expense>, ApiError> {
    Ok(Json(state.expenses.get(&caller, role, id).await?))
}

/// PUT /expenses/{id} - Edit a claim or move it through the workflow.
async fn update_expense(
    State(state): State<AppState>,
    Extension(role): Extension<Role>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<ExpenseId>,
    Json(change): Json<ExpenseChange>,
) -> Result<Json<Expense>, ApiError> {
    let expense = state.expenses.update(&caller, role, id, change).await?;
    Ok(Json(expense))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, vec![])]
    #[case(Some("draft"), vec![StatusText::Draft])]
    #[case(
        Some("draft, rejected_by_manager,"),
        vec![StatusText::Draft, StatusText::RejectedByManager]
    )]
    fn test_list_query_parses_statuses(#[case] status: Option<&str>, #[case] expected: Vec<StatusText>) {
        let query = ListQuery {
            status: status.map(String::from),
        };
        assert_eq!(query.into_filter().unwrap().statuses, expected);
    }

    #[test]
    fn test_list_query_rejects_unknown_status() {
        let query = ListQuery {
            status: Some("paid".to_string()),
        };
        let err = query.into_filter().unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
