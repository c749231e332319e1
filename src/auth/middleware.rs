//! Bearer token extraction middleware

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::state::AppState;

/// Identity attached to authenticated requests
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub account_id: String,
    pub is_superuser: bool,
}

/// Rejects requests without a valid bearer token and attaches the caller's
/// identity as a request extension. Privilege checks happen in handlers.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&request).ok_or(ApiError::Unauthorized)?;

    let claims = state.jwt.validate_token(&token).map_err(|err| {
        tracing::warn!("Rejected bearer token: {err}");
        ApiError::InvalidToken
    })?;

    request.extensions_mut().insert(AuthUser {
        account_id: claims.sub,
        is_superuser: claims.is_su,
    });

    Ok(next.run(request).await)
}

fn bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}
