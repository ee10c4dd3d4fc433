use axum::extract::State;
use axum::response::Response;

use crate::infra::http::api::state::ApiState;
use crate::infra::http::health_response;

pub async fn health(State(state): State<ApiState>) -> Response {
    health_response(state.store().health_check().await)
}
