//! Bearer token authentication.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{AppState, error::ApiError};
use claimflow_core::workflow::Role;
use claimflow_shared::{AppError, Caller, JwtError};

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Authentication middleware that validates JWT tokens.
///
/// This middleware:
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Validates the token using the JWT service
/// 3. Stores the resulting [`Caller`] in request extensions
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(token) = auth_header.and_then(extract_bearer_token) else {
        return ApiError::from(AppError::Unauthorized(
            "Authorization header with Bearer token is required".to_string(),
        ))
        .into_response();
    };

    match state.jwt_service.validate_token(token) {
        Ok(caller) => {
            request.extensions_mut().insert(caller);
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(error = %e, "Token rejected");
            let message = match e {
                JwtError::Expired => "Token has expired",
                _ => "Invalid or malformed token",
            };
            ApiError::from(AppError::Unauthorized(message.to_string())).into_response()
        }
    }
}

/// Extractor for the authenticated caller.
///
/// ```ignore
/// async fn handler(AuthCaller(caller): AuthCaller) -> impl IntoResponse {
///     caller.email
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthCaller(pub Caller);

impl AuthCaller {
    /// Fails with 403 unless the caller holds a scope granting `role`.
    pub fn require(&self, role: Role) -> Result<&Caller, ApiError> {
        if role.granted_to(&self.0) {
            Ok(&self.0)
        } else {
            Err(ApiError::from(AppError::Forbidden(format!(
                "Role {role} is not granted to the caller"
            ))))
        }
    }
}

impl<S> FromRequestParts<S> for AuthCaller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Caller>()
            .cloned()
            .map(AuthCaller)
            .ok_or_else(|| ApiError::from(AppError::Unauthorized("Authentication required".into())))
    }
}
