pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod state;

pub use state::ApiState;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

pub fn build_api_router(state: ApiState) -> Router {
    let gate_state = state.clone();

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/signup", post(handlers::signup))
        .route("/api/login", post(handlers::login))
        .route("/api/logout", post(handlers::logout))
        .route(
            "/api/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route(
            "/api/users/{id}",
            get(handlers::get_user)
                .patch(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .route(
            "/api/posts",
            get(handlers::list_posts).post(handlers::create_post),
        )
        .route(
            "/api/posts/{id}",
            get(handlers::get_post)
                .patch(handlers::update_post)
                .delete(handlers::delete_post),
        )
        .route(
            "/api/comments",
            get(handlers::list_comments).post(handlers::create_comment),
        )
        .route(
            "/api/comments/{id}",
            get(handlers::get_comment).delete(handlers::delete_comment),
        )
        .route(
            "/api/likes",
            get(handlers::list_likes)
                .post(handlers::create_like)
                .delete(handlers::delete_like_by_query),
        )
        .route(
            "/api/likes/{id}",
            get(handlers::get_like).delete(handlers::delete_like),
        )
        .route(
            "/api/followings",
            get(handlers::list_followings)
                .post(handlers::create_following)
                .delete(handlers::delete_following_by_query),
        )
        .route(
            "/api/followings/{id}",
            get(handlers::get_following).delete(handlers::delete_following),
        )
        .route(
            "/api/hides",
            get(handlers::list_hides)
                .post(handlers::create_hide)
                .delete(handlers::delete_hide_by_query),
        )
        .route("/api/hides/{id}", axum::routing::delete(handlers::delete_hide))
        .with_state(state)
        .layer(axum_middleware::from_fn_with_state(
            gate_state,
            middleware::session_gate,
        ))
}
