//! Signup, login and logout handlers

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use tracing::info;

use crate::application::auth::Signup;
use crate::domain::outcome::Outcome;

use crate::infra::http::api::error::{ApiError, auth_to_api, message_response, rejection_response};
use crate::infra::http::api::middleware::SESSION_COOKIE;
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

pub async fn signup(
    State(state): State<ApiState>,
    Json(payload): Json<SignupRequest>,
) -> Result<Response, ApiError> {
    let outcome = state
        .services
        .auth
        .signup(Signup {
            email: payload.email,
            password: payload.password,
            user_name: payload.user_name,
        })
        .await
        .map_err(auth_to_api)?;

    Ok(match outcome {
        Outcome::Done(_) => Json(SignupResponse {
            success: "user created",
        })
        .into_response(),
        Outcome::Rejected(rejection) => rejection_response(rejection),
    })
}

pub async fn login(
    State(state): State<ApiState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let auth = &state.services.auth;
    let session = match auth
        .login(&payload.email, &payload.password)
        .await
        .map_err(auth_to_api)?
    {
        Outcome::Done(session) => session,
        Outcome::Rejected(rejection) => return Ok(rejection_response(rejection)),
    };

    let cookie = Cookie::build((SESSION_COOKIE, session.access_token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(auth.token_ttl().as_secs() as i64));

    let body = LoginResponse {
        user: session.user,
        access_token: session.access_token,
    };
    Ok((jar.add(cookie), Json(body)).into_response())
}

pub async fn logout(State(state): State<ApiState>, jar: CookieJar) -> Result<Response, ApiError> {
    let Some(token) = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
    else {
        return Ok(message_response(StatusCode::OK, "missing token"));
    };

    state
        .services
        .auth
        .logout(&token)
        .await
        .map_err(auth_to_api)?;
    info!(target = "snapshare::http::session", "Session revoked");

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, Json(LogoutResponse { result: "success" })).into_response())
}
