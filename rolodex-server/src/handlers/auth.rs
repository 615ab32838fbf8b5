use axum::{Json, extract::State, extract::rejection::JsonRejection};
use chrono::Utc;
use rolodex_core::{
    RolodexError,
    api_types::{ApiResponse, TokenRequest, TokenResponse},
};
use rolodex_model::AccessToken;
use tracing::{debug, info};

use crate::infra::{
    app_state::AppState,
    errors::{AppError, AppResult},
};

const BAD_CREDENTIALS: &str = "Invalid handle or password";

/// `POST /v1/auth/token`: exchange a handle and password for a bearer
/// token valid for the configured lifetime.
pub async fn issue_token(
    State(state): State<AppState>,
    request: Result<Json<TokenRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<TokenResponse>>> {
    let Json(request) = request?;
    let identities = &state.unit_of_work().identities;

    let identity = match identities.find_by_handle(&request.id).await {
        Ok(Some(identity)) => identity,
        Ok(None) | Err(RolodexError::InvalidValue(_)) => {
            return Err(AppError::unauthorized(BAD_CREDENTIALS));
        }
        Err(err) => return Err(err.into()),
    };

    let verified = state
        .sealer()
        .verify_password(&request.password, &identity.credential)
        .map_err(RolodexError::from)?;
    if !verified {
        debug!(handle = %identity.username, "Rejected token request");
        return Err(AppError::unauthorized(BAD_CREDENTIALS));
    }

    let now = Utc::now();
    let ttl = chrono::Duration::from_std(state.config().auth.token_ttl)
        .map_err(|_| AppError::internal("token lifetime out of range"))?;

    let tokens = &state.unit_of_work().tokens;
    let purged = tokens.purge_expired(now).await?;
    if purged > 0 {
        debug!(purged, "Purged expired tokens");
    }

    let token = state.sealer().issue_token().map_err(RolodexError::from)?;
    let access = AccessToken {
        digest: state
            .sealer()
            .digest_token(&token)
            .map_err(RolodexError::from)?,
        identity_id: identity.id,
        expires_at: now + ttl,
    };
    tokens.issue(&access).await?;

    info!(handle = %identity.username, "Issued access token");
    Ok(Json(ApiResponse::success(TokenResponse {
        token,
        id: identity.username,
        expires_at: access.expires_at,
    })))
}
