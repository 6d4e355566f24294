//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST routes per role under `/api/v1`
//! - Bearer token authentication middleware
//! - JSON error responses

pub mod error;
pub mod middleware;
pub mod routes;

use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use claimflow_core::expense::ExpenseService;
use claimflow_core::export::ExportPipeline;
use claimflow_shared::JwtService;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Claim creation, updates, attachments and journal.
    pub expenses: ExpenseService,
    /// Booking and payment file exports.
    pub exports: ExportPipeline,
    /// JWT service for token validation.
    pub jwt_service: Arc<JwtService>,
    /// Largest accepted attachment upload, in bytes.
    pub max_upload_bytes: usize,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
