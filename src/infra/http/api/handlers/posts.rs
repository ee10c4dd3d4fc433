//! Posts handlers

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::application::posts::{NewPost, PostPatch};
use crate::domain::outcome::Rejection;
use crate::domain::types::Collection;

use super::{found, respond};
use crate::infra::http::api::error::{
    ApiError, message_response, rejection_response, service_to_api,
};
use crate::infra::http::api::middleware::{AuthenticatedUser, require_owner};
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

const UNKNOWN_USER: &str = "User does not exist";

pub async fn list_posts(
    State(state): State<ApiState>,
    Query(query): Query<PostListQuery>,
) -> Result<Response, ApiError> {
    let services = &state.services;

    if let Some(user_id) = query.user_id {
        if services
            .users
            .get_by_id(user_id)
            .await
            .map_err(service_to_api)?
            .is_none()
        {
            return Ok(message_response(StatusCode::OK, UNKNOWN_USER));
        }
        let posts = services
            .posts
            .get_by_user(user_id)
            .await
            .map_err(service_to_api)?;
        return Ok(Json(posts).into_response());
    }

    if let Some(user_name) = query.user_name.as_deref() {
        if services
            .users
            .find_by_user_name(user_name)
            .await
            .map_err(service_to_api)?
            .is_empty()
        {
            return Ok(message_response(StatusCode::OK, UNKNOWN_USER));
        }
        let posts = services
            .posts
            .get_by_user_name(user_name)
            .await
            .map_err(service_to_api)?;
        return Ok(Json(posts).into_response());
    }

    let posts = services.posts.get_all().await.map_err(service_to_api)?;
    Ok(Json(posts).into_response())
}

pub async fn get_post(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let post = state
        .services
        .posts
        .get_by_id(id)
        .await
        .map_err(service_to_api)?;
    Ok(found(post, Collection::Post))
}

pub async fn create_post(
    State(state): State<ApiState>,
    Json(payload): Json<PostCreateRequest>,
) -> Result<Response, ApiError> {
    let outcome = state
        .services
        .posts
        .create(NewPost {
            user_id: payload.user_id,
            img_path: payload.img_path,
            description: payload.description,
        })
        .await
        .map_err(service_to_api)?;
    Ok(respond(outcome))
}

pub async fn update_post(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PostPatchRequest>,
) -> Result<Response, ApiError> {
    let posts = &state.services.posts;
    let Some(post) = posts.get_by_id(id).await.map_err(service_to_api)? else {
        return Ok(rejection_response(Rejection::Missing(Collection::Post)));
    };
    if let Err(response) = require_owner(user, post.user_id) {
        return Ok(response);
    }

    let patch = PostPatch {
        img_path: payload.img_path,
        description: payload.description,
    };
    let outcome = posts.update(id, &patch).await.map_err(service_to_api)?;
    Ok(respond(outcome))
}

pub async fn delete_post(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let posts = &state.services.posts;
    let Some(post) = posts.get_by_id(id).await.map_err(service_to_api)? else {
        return Ok(rejection_response(Rejection::Missing(Collection::Post)));
    };
    if let Err(response) = require_owner(user, post.user_id) {
        return Ok(response);
    }

    let outcome = posts.delete(id).await.map_err(service_to_api)?;
    Ok(respond(outcome))
}
