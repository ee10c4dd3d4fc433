//! Entity operations over the document store and the cache.

pub mod auth;
pub mod comments;
pub mod context;
pub mod error;
pub mod followings;
pub mod hides;
pub mod likes;
pub mod posts;
pub mod repos;
pub mod users;

pub use context::{AppServices, Backends};
