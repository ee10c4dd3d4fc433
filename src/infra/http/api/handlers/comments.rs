//! Comment handlers

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::application::comments::NewComment;
use crate::domain::outcome::Rejection;
use crate::domain::types::Collection;

use super::{found, respond};
use crate::infra::http::api::error::{ApiError, rejection_response, service_to_api};
use crate::infra::http::api::middleware::{AuthenticatedUser, require_owner};
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

pub async fn list_comments(
    State(state): State<ApiState>,
    Query(query): Query<UserPostQuery>,
) -> Result<Response, ApiError> {
    let comments = &state.services.comments;
    let records = match (query.user_id, query.post_id) {
        (Some(user_id), Some(post_id)) => comments.get_by_user_and_post(user_id, post_id).await,
        (Some(user_id), None) => comments.get_by_user(user_id).await,
        (None, Some(post_id)) => comments.get_by_post(post_id).await,
        (None, None) => comments.get_all().await,
    }
    .map_err(service_to_api)?;

    Ok(Json(records).into_response())
}

pub async fn get_comment(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let comment = state
        .services
        .comments
        .get_by_id(id)
        .await
        .map_err(service_to_api)?;
    Ok(found(comment, Collection::Comment))
}

pub async fn create_comment(
    State(state): State<ApiState>,
    Json(payload): Json<CommentCreateRequest>,
) -> Result<Response, ApiError> {
    let outcome = state
        .services
        .comments
        .create(NewComment {
            user_id: payload.user_id,
            post_id: payload.post_id,
            content: payload.content,
            user_name: payload.user_name,
        })
        .await
        .map_err(service_to_api)?;
    Ok(respond(outcome))
}

pub async fn delete_comment(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let comments = &state.services.comments;
    let Some(comment) = comments.get_by_id(id).await.map_err(service_to_api)? else {
        return Ok(rejection_response(Rejection::Missing(Collection::Comment)));
    };
    if let Err(response) = require_owner(user, comment.user_id) {
        return Ok(response);
    }

    let outcome = comments.delete(id).await.map_err(service_to_api)?;
    Ok(respond(outcome))
}
