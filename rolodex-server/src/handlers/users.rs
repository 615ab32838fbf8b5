//! `/v1/user/` handlers. Each one hands the authenticated caller and the
//! parsed payload to the [`ResourceController`] and renders the result.
//!
//! [`ResourceController`]: rolodex_core::controller::ResourceController

use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use rolodex_core::{api_types::ApiResponse, payload::Payload};
use rolodex_model::Identity;
use serde_json::Value;

use crate::infra::{app_state::AppState, errors::AppResult};

pub async fn list_users(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
) -> AppResult<Json<ApiResponse<Vec<Value>>>> {
    let controller = state.controller();
    let rendered = controller
        .list(&caller)
        .await?
        .iter()
        .map(|identity| controller.render(identity))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(ApiResponse::success(rendered)))
}

/// No match renders as `200` with `data: null`.
pub async fn get_user(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(pk): Path<String>,
) -> AppResult<Json<ApiResponse<Value>>> {
    let controller = state.controller();
    let rendered = match controller.detail(&caller, &pk).await? {
        Some(identity) => controller.render(&identity)?,
        None => Value::Null,
    };

    Ok(Json(ApiResponse::success(rendered)))
}

pub async fn create_user(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    payload: Result<Json<Payload>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ApiResponse<Value>>)> {
    let Json(payload) = payload?;
    let controller = state.controller();
    let created = controller.create(&caller, &payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(controller.render(&created)?)),
    ))
}

/// Serves both `PUT` and `PATCH`; either way fields left out keep their
/// stored value.
pub async fn update_user(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(pk): Path<String>,
    payload: Result<Json<Payload>, JsonRejection>,
) -> AppResult<Json<ApiResponse<Value>>> {
    let Json(payload) = payload?;
    let controller = state.controller();
    let updated = controller.update(&caller, &pk, &payload).await?;

    Ok(Json(ApiResponse::success(controller.render(&updated)?)))
}
