//! Hide handlers

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::domain::outcome::Rejection;
use crate::domain::types::Collection;

use super::respond;
use crate::infra::http::api::error::{
    ApiError, message_response, rejection_response, service_to_api,
};
use crate::infra::http::api::middleware::{AuthenticatedUser, require_owner};
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

pub async fn list_hides(
    State(state): State<ApiState>,
    Query(query): Query<UserPostQuery>,
) -> Result<Response, ApiError> {
    let hides = &state.services.hides;
    let records = match (query.user_id, query.post_id) {
        (Some(user_id), None) => hides.get_by_user(user_id).await,
        (None, None) => hides.get_all().await,
        (_, Some(_)) => {
            return Ok(message_response(StatusCode::OK, "Missing userID parameter"));
        }
    }
    .map_err(service_to_api)?;

    Ok(Json(records).into_response())
}

pub async fn create_hide(
    State(state): State<ApiState>,
    Json(payload): Json<HideCreateRequest>,
) -> Result<Response, ApiError> {
    let outcome = state
        .services
        .hides
        .create(payload.user_id, payload.post_id)
        .await
        .map_err(service_to_api)?;
    Ok(respond(outcome))
}

pub async fn delete_hide(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let hides = &state.services.hides;
    let Some(hide) = hides.get_by_id(id).await.map_err(service_to_api)? else {
        return Ok(rejection_response(Rejection::Missing(Collection::Hide)));
    };
    if let Err(response) = require_owner(user, hide.user_id) {
        return Ok(response);
    }

    let outcome = hides.delete(id).await.map_err(service_to_api)?;
    Ok(respond(outcome))
}

pub async fn delete_hide_by_query(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<UserPostQuery>,
) -> Result<Response, ApiError> {
    let (Some(user_id), Some(post_id)) = (query.user_id, query.post_id) else {
        return Ok(message_response(StatusCode::BAD_REQUEST, "missing query params"));
    };
    if let Err(response) = require_owner(user, user_id) {
        return Ok(response);
    }

    let outcome = state
        .services
        .hides
        .delete_by_user_and_post(user_id, post_id)
        .await
        .map_err(service_to_api)?;
    Ok(respond(outcome))
}
