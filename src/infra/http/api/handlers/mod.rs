//! API handlers organized by resource type.
//!
//! Each submodule contains handlers for one collection. Shared response
//! helpers are defined here.

mod auth;
mod comments;
mod followings;
mod health;
mod hides;
mod likes;
mod posts;
mod users;

pub use auth::*;
pub use comments::*;
pub use followings::*;
pub use health::*;
pub use hides::*;
pub use likes::*;
pub use posts::*;
pub use users::*;

use axum::Json;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::domain::outcome::{Outcome, Rejection};
use crate::domain::types::Collection;

use super::error::rejection_response;

/// Successful outcomes as JSON, rejections as `200 {"error": ...}`.
fn respond<T: Serialize>(outcome: Outcome<T>) -> Response {
    match outcome {
        Outcome::Done(value) => Json(value).into_response(),
        Outcome::Rejected(rejection) => rejection_response(rejection),
    }
}

fn found<T: Serialize>(value: Option<T>, collection: Collection) -> Response {
    match value {
        Some(value) => Json(value).into_response(),
        None => rejection_response(Rejection::Missing(collection)),
    }
}
