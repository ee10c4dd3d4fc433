//! User handlers

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::application::users::NewUser;
use crate::domain::types::Collection;

use super::{found, respond};
use crate::infra::http::api::error::{ApiError, service_to_api};
use crate::infra::http::api::middleware::{AuthenticatedUser, require_owner};
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

pub async fn list_users(
    State(state): State<ApiState>,
    Query(query): Query<UserListQuery>,
) -> Result<Response, ApiError> {
    let users = &state.services.users;
    let records = if let Some(name) = query.user_name.as_deref() {
        users.find_by_user_name(name).await
    } else if let Some(prefix) = query.user_name_like.as_deref() {
        users.search_by_prefix(prefix).await
    } else {
        users.get_all().await
    }
    .map_err(service_to_api)?;

    Ok(Json(records).into_response())
}

pub async fn get_user(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let user = state
        .services
        .users
        .get_by_id(id)
        .await
        .map_err(service_to_api)?;
    Ok(found(user, Collection::User))
}

pub async fn create_user(
    State(state): State<ApiState>,
    Json(payload): Json<UserCreateRequest>,
) -> Result<Response, ApiError> {
    let outcome = state
        .services
        .users
        .create(NewUser {
            user_name: payload.user_name,
            email: payload.email,
        })
        .await
        .map_err(service_to_api)?;
    Ok(respond(outcome))
}

pub async fn update_user(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UserPatchRequest>,
) -> Result<Response, ApiError> {
    if let Err(response) = require_owner(user, id) {
        return Ok(response);
    }

    let outcome = state
        .services
        .users
        .update_motto(id, &payload.user_motto)
        .await
        .map_err(service_to_api)?;
    Ok(respond(outcome))
}

pub async fn delete_user(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    if let Err(response) = require_owner(user, id) {
        return Ok(response);
    }

    let outcome = state
        .services
        .users
        .delete(id)
        .await
        .map_err(service_to_api)?;
    Ok(respond(outcome))
}
