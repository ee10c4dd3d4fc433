use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::auth::AuthError;
use crate::application::error::{ErrorReport, ServiceError};
use crate::application::repos::RepoError;
use crate::domain::error::DomainError;
use crate::domain::outcome::Rejection;

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorMessage,
}

pub mod codes {
    pub const BAD_REQUEST: &str = "bad_request";
    pub const DUPLICATE: &str = "duplicate";
    pub const NOT_FOUND: &str = "not_found";
    pub const INVALID_INPUT: &str = "invalid_input";
    pub const INTEGRITY: &str = "integrity_error";
    pub const DB_TIMEOUT: &str = "db_timeout";
    pub const REPO: &str = "repo_error";
    pub const CACHE: &str = "cache_error";
    pub const AUTH: &str = "auth_error";
}

#[derive(Debug, Serialize)]
pub struct ApiErrorMessage {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// Infrastructure and malformed-request failures, rendered as a structured body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: &'static str,
    hint: Option<String>,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        code: &'static str,
        message: &'static str,
        hint: Option<String>,
    ) -> Self {
        Self {
            status,
            code,
            message,
            hint,
        }
    }

    pub fn bad_request(message: &'static str, hint: Option<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::BAD_REQUEST, message, hint)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let hint = self.hint.clone();
        let body = ApiErrorBody {
            error: ApiErrorMessage {
                code: self.code.to_string(),
                message: self.message.to_string(),
                hint: self.hint,
            },
        };
        let mut response = (self.status, Json(body)).into_response();
        ErrorReport::from_message(
            "infra::http::api",
            self.status,
            format!("{}: {}", self.code, hint.as_deref().unwrap_or(self.message)),
        )
        .attach(&mut response);
        response
    }
}

#[derive(Debug, Serialize)]
struct MessageBody<'a> {
    error: &'a str,
}

/// `{"error": message}` with the given status; the body shape clients of the
/// session and ownership checks expect.
pub fn message_response(status: StatusCode, message: &str) -> Response {
    let mut response = (status, Json(MessageBody { error: message })).into_response();
    if status.is_client_error() {
        ErrorReport::from_message("infra::http::api::session", status, message).attach(&mut response);
    }
    response
}

/// Business-rule rejections are answered with `200` and an error message.
pub fn rejection_response(rejection: Rejection) -> Response {
    message_response(StatusCode::OK, &rejection.message())
}

pub fn repo_to_api(err: RepoError) -> ApiError {
    match err {
        RepoError::Duplicate { constraint } => ApiError::new(
            StatusCode::CONFLICT,
            codes::DUPLICATE,
            "Duplicate record",
            Some(constraint),
        ),
        RepoError::NotFound => ApiError::new(
            StatusCode::NOT_FOUND,
            codes::NOT_FOUND,
            "Resource not found",
            None,
        ),
        RepoError::InvalidInput { message } => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_INPUT,
            "Invalid input",
            Some(message),
        ),
        RepoError::Integrity { message } => ApiError::new(
            StatusCode::CONFLICT,
            codes::INTEGRITY,
            "Integrity constraint violated",
            Some(message),
        ),
        RepoError::Timeout => ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::DB_TIMEOUT,
            "Database timeout",
            None,
        ),
        err @ (RepoError::Persistence(_) | RepoError::Decode { .. }) => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::REPO,
            "Persistence error",
            Some(err.to_string()),
        ),
    }
}

pub fn service_to_api(err: ServiceError) -> ApiError {
    match err {
        ServiceError::Repo(err) => repo_to_api(err),
        ServiceError::Cache(err) => ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::CACHE,
            "Cache unavailable",
            Some(err.to_string()),
        ),
        ServiceError::Domain(DomainError::Validation { message }) => {
            ApiError::new(StatusCode::BAD_REQUEST, codes::INVALID_INPUT, "Invalid input", Some(message))
        }
    }
}

pub fn auth_to_api(err: AuthError) -> ApiError {
    match err {
        AuthError::Service(err) => service_to_api(err),
        AuthError::MissingToken | AuthError::InvalidToken => ApiError::new(
            StatusCode::UNAUTHORIZED,
            codes::AUTH,
            "Session rejected",
            Some(err.to_string()),
        ),
        AuthError::Hash(_) | AuthError::Signing(_) => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::AUTH,
            "Credential processing failed",
            Some(err.to_string()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheError;

    #[test]
    fn infrastructure_failures_map_to_server_errors() {
        let err = service_to_api(ServiceError::Repo(RepoError::Persistence("boom".into())));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let err = service_to_api(ServiceError::Cache(CacheError::backend("redis", "down")));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn validation_maps_to_bad_request() {
        let err = service_to_api(ServiceError::Domain(DomainError::validation("empty")));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn rejections_answer_ok_with_report_free_body() {
        let response = rejection_response(Rejection::SelfFollow);
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.extensions().get::<ErrorReport>().is_none());
    }

    #[test]
    fn session_failures_carry_a_report() {
        let response = message_response(StatusCode::UNAUTHORIZED, "missing token");
        assert!(response.extensions().get::<ErrorReport>().is_some());
    }
}
