pub mod api;
mod middleware;

pub use api::{ApiState, build_api_router};

use axum::Router;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::middleware as axum_middleware;
use axum::response::{IntoResponse, Response};
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::application::error::ErrorReport;
use crate::application::repos::RepoError;
use crate::config::ServerSettings;

use self::middleware::{log_responses, set_request_context};

fn health_response(result: Result<(), RepoError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::db_health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}

/// The full HTTP surface: API routes behind the session gate, wrapped in
/// CORS, request ids and response logging.
pub fn build_router(state: ApiState, server: &ServerSettings) -> Router {
    build_api_router(state)
        .layer(cors_layer(&server.cors_origin))
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    match HeaderValue::from_str(origin) {
        Ok(origin) => layer.allow_origin(origin),
        Err(err) => {
            warn!(
                target = "snapshare::http",
                error = %err,
                "Ignoring unparsable CORS origin"
            );
            layer
        }
    }
}
