use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::debug;

use crate::infra::{
    app_state::AppState,
    errors::{AppError, AppResult},
};

const INVALID_TOKEN: &str = "Invalid or expired token";

/// Resolve the bearer token to its [`Identity`](rolodex_model::Identity)
/// and attach it to the request. Every failure to do so is a 401.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let token = extract_bearer_token(&request)?;

    let digest = state
        .sealer()
        .digest_token(token)
        .map_err(rolodex_core::RolodexError::from)?;

    let identity_id = state
        .unit_of_work()
        .tokens
        .resolve(&digest, Utc::now())
        .await?
        .ok_or_else(|| AppError::unauthorized(INVALID_TOKEN))?;

    let caller = state
        .unit_of_work()
        .identities
        .find_by_id(identity_id)
        .await?
        .ok_or_else(|| AppError::unauthorized(INVALID_TOKEN))?;

    debug!(handle = %caller.username, "Authenticated request");
    request.extensions_mut().insert(caller);

    Ok(next.run(request).await)
}

fn extract_bearer_token(request: &Request) -> AppResult<&str> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("Authentication required"))?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::unauthorized("Malformed authorization header"))
}
