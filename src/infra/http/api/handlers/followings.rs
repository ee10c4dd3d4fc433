//! Following handlers

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::application::followings::NewFollowing;
use crate::domain::outcome::Rejection;
use crate::domain::types::Collection;

use super::{found, respond};
use crate::infra::http::api::error::{
    ApiError, message_response, rejection_response, service_to_api,
};
use crate::infra::http::api::middleware::{AuthenticatedUser, require_owner};
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

pub async fn list_followings(
    State(state): State<ApiState>,
    Query(query): Query<FollowingQuery>,
) -> Result<Response, ApiError> {
    let followings = &state.services.followings;
    let records = match (query.follower_id, query.following_id) {
        (Some(follower_id), Some(following_id)) => {
            followings.get_by_pair(follower_id, following_id).await
        }
        (Some(follower_id), None) => followings.get_by_follower(follower_id).await,
        (None, Some(following_id)) => followings.get_by_following(following_id).await,
        (None, None) => followings.get_all().await,
    }
    .map_err(service_to_api)?;

    Ok(Json(records).into_response())
}

pub async fn get_following(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let following = state
        .services
        .followings
        .get_by_id(id)
        .await
        .map_err(service_to_api)?;
    Ok(found(following, Collection::Following))
}

pub async fn create_following(
    State(state): State<ApiState>,
    Json(payload): Json<FollowingCreateRequest>,
) -> Result<Response, ApiError> {
    let outcome = state
        .services
        .followings
        .create(NewFollowing {
            follower_id: payload.follower_id,
            following_id: payload.following_id,
            follower_name: payload.follower_name,
            following_name: payload.following_name,
        })
        .await
        .map_err(service_to_api)?;
    Ok(respond(outcome))
}

pub async fn delete_following(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let followings = &state.services.followings;
    let Some(following) = followings.get_by_id(id).await.map_err(service_to_api)? else {
        return Ok(rejection_response(Rejection::Missing(Collection::Following)));
    };
    if let Err(response) = require_owner(user, following.follower_id) {
        return Ok(response);
    }

    let outcome = followings.delete(id).await.map_err(service_to_api)?;
    Ok(respond(outcome))
}

pub async fn delete_following_by_query(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<FollowingQuery>,
) -> Result<Response, ApiError> {
    let (Some(follower_id), Some(following_id)) = (query.follower_id, query.following_id) else {
        return Ok(message_response(StatusCode::BAD_REQUEST, "missing query params"));
    };
    if let Err(response) = require_owner(user, follower_id) {
        return Ok(response);
    }

    let outcome = state
        .services
        .followings
        .delete_by_pair(follower_id, following_id)
        .await
        .map_err(service_to_api)?;
    Ok(respond(outcome))
}
