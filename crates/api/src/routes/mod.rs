//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth_middleware};
use claimflow_core::workflow::Role;

pub mod attachments;
pub mod catalog;
pub mod documents;
pub mod expenses;
pub mod health;
pub mod journal;

/// Creates the API router; everything but the health check requires a
/// bearer token.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(catalog::routes())
        .nest(
            "/employees",
            expenses::employee_routes(state.max_upload_bytes),
        )
        .nest("/managers", expenses::approver_routes(Role::Manager))
        .nest(
            "/creditors",
            expenses::approver_routes(Role::Creditor).merge(journal::routes()),
        )
        .nest("/controllers", expenses::approver_routes(Role::Controller))
        .nest("/finances", documents::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(protected_routes)
}
