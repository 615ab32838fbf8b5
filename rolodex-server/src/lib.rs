//! # Rolodex Server
//!
//! HTTP surface for the Rolodex account service.
//!
//! - `POST /v1/auth/token` exchanges a handle and password for a bearer token
//! - `/v1/user/` and `/v1/user/{pk}/` expose the role-gated user resource
//! - `GET /health` is a liveness probe
//!
//! Routing, authentication and error rendering live here. Authorization and
//! every domain rule live in `rolodex-core`.

pub mod auth;
pub mod handlers;
pub mod infra;
pub mod routes;

pub use infra::app_state::AppState;

use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{HeaderValue, Method, Request, Response, header},
    routing::get,
};
use rolodex_config::CorsConfig;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{Span, warn};

use crate::infra::telemetry::ACCESS_TARGET;

/// Assemble the full application router.
pub fn create_app(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                target: ACCESS_TARGET,
                "request",
                method = %request.method(),
                uri = %request.uri()
            )
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    target: ACCESS_TARGET,
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis() as u64,
                    "served"
                );
            },
        );

    let mut router = Router::new()
        .route("/health", get(handlers::health))
        .merge(routes::create_api_router(state.clone()))
        .layer(ServiceBuilder::new().layer(trace_layer));

    if let Some(cors) = cors_layer(&state.config().cors) {
        router = router.layer(cors);
    }

    router.with_state(state)
}

/// `None` when no origins are configured.
fn cors_layer(config: &CorsConfig) -> Option<CorsLayer> {
    if config.allowed_origins.is_empty() {
        return None;
    }

    let allow_origin = if config.is_wildcard_included() {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(%origin, "Ignoring malformed CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    Some(
        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_is_off_without_origins() {
        assert!(cors_layer(&CorsConfig::default()).is_none());
    }

    #[test]
    fn cors_is_on_with_origins() {
        let config = CorsConfig {
            allowed_origins: vec!["https://app.example.com".into()],
        };
        assert!(cors_layer(&config).is_some());
    }
}
