use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::{
    AppState,
    auth::auth_middleware,
    handlers::{auth, users},
};

/// Create all v1 API routes
pub fn create_v1_router(state: AppState) -> Router<AppState> {
    Router::new()
        // Public authentication endpoint
        .route("/auth/token", post(auth::issue_token))
        .merge(create_user_routes(state))
}

/// The user resource. Every route requires a bearer token.
fn create_user_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/user/", get(users::list_users).post(users::create_user))
        .route(
            "/user/{pk}/",
            get(users::get_user)
                .put(users::update_user)
                .patch(users::update_user),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
