use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use tracing::debug;
use uuid::Uuid;

use crate::application::auth::AuthError;

use super::error::{auth_to_api, message_response};
use super::state::ApiState;

pub const SESSION_COOKIE: &str = "accessToken";

/// Routes reachable without a session.
const OPEN_PATHS: [&str; 4] = ["/api/login", "/api/signup", "/api/logout", "/health"];

/// The user a session token was issued to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: Uuid,
}

pub async fn session_gate(
    State(state): State<ApiState>,
    jar: CookieJar,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if OPEN_PATHS.contains(&request.uri().path()) {
        return next.run(request).await;
    }

    let Some(token) = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
    else {
        return message_response(StatusCode::UNAUTHORIZED, "missing token");
    };

    let claims = match state.services.auth.authenticate(&token).await {
        Ok(claims) => claims,
        Err(AuthError::MissingToken) => {
            return message_response(StatusCode::UNAUTHORIZED, "missing token");
        }
        Err(AuthError::InvalidToken) => {
            debug!(target = "snapshare::http::session", "Rejected session token");
            return message_response(StatusCode::UNAUTHORIZED, "invalid token");
        }
        Err(err) => return auth_to_api(err).into_response(),
    };

    let user = AuthenticatedUser { id: claims.id };
    request.extensions_mut().insert(user);
    let mut response = next.run(request).await;
    response.extensions_mut().insert(user);
    response
}

/// Refuses writes to data owned by someone other than the session user.
pub fn require_owner(user: AuthenticatedUser, owner: Uuid) -> Result<(), Response> {
    if user.id == owner {
        Ok(())
    } else {
        Err(message_response(
            StatusCode::UNAUTHORIZED,
            "you cannot delete other user's data.",
        ))
    }
}
