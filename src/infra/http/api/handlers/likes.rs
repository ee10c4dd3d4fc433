//! Like handlers

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::application::likes::NewLike;
use crate::domain::outcome::Rejection;
use crate::domain::types::Collection;

use super::{found, respond};
use crate::infra::http::api::error::{
    ApiError, message_response, rejection_response, service_to_api,
};
use crate::infra::http::api::middleware::{AuthenticatedUser, require_owner};
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

pub async fn list_likes(
    State(state): State<ApiState>,
    Query(query): Query<UserPostQuery>,
) -> Result<Response, ApiError> {
    let likes = state
        .services
        .likes
        .query(query.user_id, query.post_id)
        .await
        .map_err(service_to_api)?;
    Ok(Json(likes).into_response())
}

pub async fn get_like(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let like = state
        .services
        .likes
        .get_by_id(id)
        .await
        .map_err(service_to_api)?;
    Ok(found(like, Collection::Like))
}

pub async fn create_like(
    State(state): State<ApiState>,
    Json(payload): Json<LikeCreateRequest>,
) -> Result<Response, ApiError> {
    let outcome = state
        .services
        .likes
        .create(NewLike {
            user_id: payload.user_id,
            post_id: payload.post_id,
            user_name: payload.user_name,
        })
        .await
        .map_err(service_to_api)?;
    Ok(respond(outcome))
}

pub async fn delete_like(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let likes = &state.services.likes;
    let Some(like) = likes.get_by_id(id).await.map_err(service_to_api)? else {
        return Ok(rejection_response(Rejection::Missing(Collection::Like)));
    };
    if let Err(response) = require_owner(user, like.user_id) {
        return Ok(response);
    }

    let outcome = likes.delete(id).await.map_err(service_to_api)?;
    Ok(respond(outcome))
}

pub async fn delete_like_by_query(
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
        .likes
        .delete_by_user_and_post(user_id, post_id)
        .await
        .map_err(service_to_api)?;
    Ok(respond(outcome))
}
