//! Cache key definitions.
//!
//! Keys render to `<family>:<subject>`. One family may hold a single entity
//! or a collection keyed by its owner (`post:<postID>` is one post,
//! `post:<userID>` is that user's posts), so every variant records its shape.

use std::fmt;
use std::time::Duration;

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// TTL applied to every entity and collection key at write time.
pub const ENTITY_CACHE_TTL: Duration = Duration::from_secs(1800);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyShape {
    Single,
    Collection,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    // Singletons
    User(Uuid),
    Post(Uuid),
    Hide(Uuid),

    // Collections keyed by owner
    PostsByUser(Uuid),
    CommentsByPost(Uuid),
    CommentsByUser(Uuid),
    FollowingsByFollower(Uuid),
    HidesByUser(Uuid),
    HidesByPost(Uuid),

    // Session bookkeeping
    LoginAttempts(String),
    LoginLocked(String),
    RevokedToken(String),
}

impl CacheKey {
    /// Key marking a session token as revoked. The raw token never reaches the cache.
    pub fn revoked_token(token: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        Self::RevokedToken(hex::encode(hasher.finalize()))
    }

    pub fn family(&self) -> &'static str {
        match self {
            CacheKey::User(_) => "user",
            CacheKey::Post(_) | CacheKey::PostsByUser(_) => "post",
            CacheKey::CommentsByPost(_) | CacheKey::CommentsByUser(_) => "comment",
            CacheKey::FollowingsByFollower(_) => "following",
            CacheKey::Hide(_) | CacheKey::HidesByUser(_) | CacheKey::HidesByPost(_) => "hide",
            CacheKey::LoginAttempts(_) => "login_attempts",
            CacheKey::LoginLocked(_) => "login_locked",
            CacheKey::RevokedToken(_) => "revoked",
        }
    }

    pub fn shape(&self) -> KeyShape {
        match self {
            CacheKey::User(_)
            | CacheKey::Post(_)
            | CacheKey::Hide(_)
            | CacheKey::LoginAttempts(_)
            | CacheKey::LoginLocked(_)
            | CacheKey::RevokedToken(_) => KeyShape::Single,
            CacheKey::PostsByUser(_)
            | CacheKey::CommentsByPost(_)
            | CacheKey::CommentsByUser(_)
            | CacheKey::FollowingsByFollower(_)
            | CacheKey::HidesByUser(_)
            | CacheKey::HidesByPost(_) => KeyShape::Collection,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let family = self.family();
        match self {
            CacheKey::User(id)
            | CacheKey::Post(id)
            | CacheKey::Hide(id)
            | CacheKey::PostsByUser(id)
            | CacheKey::CommentsByPost(id)
            | CacheKey::CommentsByUser(id)
            | CacheKey::FollowingsByFollower(id)
            | CacheKey::HidesByUser(id)
            | CacheKey::HidesByPost(id) => write!(f, "{family}:{id}"),
            CacheKey::LoginAttempts(subject)
            | CacheKey::LoginLocked(subject)
            | CacheKey::RevokedToken(subject) => write!(f, "{family}:{subject}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_and_entity_keys_share_a_family() {
        let id = Uuid::nil();
        assert_eq!(CacheKey::Post(id).to_string(), CacheKey::PostsByUser(id).to_string());
        assert_ne!(CacheKey::Post(id), CacheKey::PostsByUser(id));
        assert_eq!(CacheKey::Post(id).shape(), KeyShape::Single);
        assert_eq!(CacheKey::PostsByUser(id).shape(), KeyShape::Collection);
    }

    #[test]
    fn keys_render_as_family_and_id() {
        let id = Uuid::parse_str("6f1c1c8e-8a2b-4c55-9d0e-2f6f7f3e1a10").expect("uuid");
        assert_eq!(
            CacheKey::CommentsByPost(id).to_string(),
            "comment:6f1c1c8e-8a2b-4c55-9d0e-2f6f7f3e1a10"
        );
        assert_eq!(
            CacheKey::FollowingsByFollower(id).to_string(),
            "following:6f1c1c8e-8a2b-4c55-9d0e-2f6f7f3e1a10"
        );
    }

    #[test]
    fn revoked_token_key_hides_the_token() {
        let key = CacheKey::revoked_token("secret.jwt.value");
        let rendered = key.to_string();
        assert!(rendered.starts_with("revoked:"));
        assert!(!rendered.contains("secret"));
        assert_eq!(rendered.len(), "revoked:".len() + 64);
        assert_eq!(key, CacheKey::revoked_token("secret.jwt.value"));
    }

    #[test]
    fn entity_ttl_is_thirty_minutes() {
        assert_eq!(ENTITY_CACHE_TTL.as_secs(), 1800);
    }
}
