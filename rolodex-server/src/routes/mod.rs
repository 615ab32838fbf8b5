pub mod v1;

use crate::AppState;
use axum::Router;

/// Create the API router with every version mounted
pub fn create_api_router(state: AppState) -> Router<AppState> {
    Router::new().nest("/v1", v1::create_v1_router(state))
}
