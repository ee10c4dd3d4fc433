//! Domain entities mirrored from stored documents.
//!
//! Records carry the assigned `_id`; drafts are the insert payloads the store
//! assigns an id to.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use time::OffsetDateTime;
use uuid::Uuid;

use super::types::Collection;

pub const DEFAULT_MOTTO: &str = "No motto yet";
pub const DEFAULT_AVATAR: &str = "https://avatars.githubusercontent.com/u/97165289";
pub const DEFAULT_DESCRIPTION: &str = "No description";

/// A stored document type with a fixed collection.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: Collection;

    fn id(&self) -> Uuid;
}

macro_rules! entity {
    ($record:ty, $collection:expr) => {
        impl Entity for $record {
            const COLLECTION: Collection = $collection;

            fn id(&self) -> Uuid {
                self.id
            }
        }
    };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user_name: String,
    pub email: String,
    #[serde(default = "default_motto")]
    pub user_motto: String,
    #[serde(default = "default_avatar")]
    pub user_avatar: String,
    #[serde(default)]
    pub follower_count: i64,
    #[serde(default)]
    pub following_count: i64,
    #[serde(default)]
    pub post_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "userID")]
    pub user_id: Uuid,
    pub user_name: String,
    pub img_path: String,
    #[serde(default = "default_description")]
    pub description: String,
    #[serde(default)]
    pub like_count: i64,
    #[serde(default)]
    pub comment_count: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "userID")]
    pub user_id: Uuid,
    pub user_name: String,
    #[serde(rename = "postID")]
    pub post_id: Uuid,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowingRecord {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "followerID")]
    pub follower_id: Uuid,
    pub follower_name: String,
    #[serde(rename = "followingID")]
    pub following_id: Uuid,
    pub following_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeRecord {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "postID")]
    pub post_id: Uuid,
    #[serde(rename = "userID")]
    pub user_id: Uuid,
    pub user_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HideRecord {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "userID")]
    pub user_id: Uuid,
    #[serde(rename = "postID")]
    pub post_id: Uuid,
}

/// Stored credential; `password` is an argon2 PHC string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRecord {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub email: String,
    pub password: String,
}

entity!(UserRecord, Collection::User);
entity!(PostRecord, Collection::Post);
entity!(CommentRecord, Collection::Comment);
entity!(FollowingRecord, Collection::Following);
entity!(LikeRecord, Collection::Like);
entity!(HideRecord, Collection::Hide);
entity!(LoginRecord, Collection::Login);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDraft {
    pub user_name: String,
    pub email: String,
    pub user_motto: String,
    pub user_avatar: String,
    pub follower_count: i64,
    pub following_count: i64,
    pub post_count: i64,
}

impl UserDraft {
    pub fn new(user_name: String, email: String) -> Self {
        Self {
            user_name,
            email,
            user_motto: DEFAULT_MOTTO.to_string(),
            user_avatar: DEFAULT_AVATAR.to_string(),
            follower_count: 0,
            following_count: 0,
            post_count: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDraft {
    #[serde(rename = "userID")]
    pub user_id: Uuid,
    pub user_name: String,
    pub img_path: String,
    pub description: String,
    pub like_count: i64,
    pub comment_count: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDraft {
    #[serde(rename = "userID")]
    pub user_id: Uuid,
    pub user_name: String,
    #[serde(rename = "postID")]
    pub post_id: Uuid,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowingDraft {
    #[serde(rename = "followerID")]
    pub follower_id: Uuid,
    pub follower_name: String,
    #[serde(rename = "followingID")]
    pub following_id: Uuid,
    pub following_name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeDraft {
    #[serde(rename = "postID")]
    pub post_id: Uuid,
    #[serde(rename = "userID")]
    pub user_id: Uuid,
    pub user_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HideDraft {
    #[serde(rename = "userID")]
    pub user_id: Uuid,
    #[serde(rename = "postID")]
    pub post_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginDraft {
    pub email: String,
    pub password: String,
}

fn default_motto() -> String {
    DEFAULT_MOTTO.to_string()
}

fn default_avatar() -> String {
    DEFAULT_AVATAR.to_string()
}

fn default_description() -> String {
    DEFAULT_DESCRIPTION.to_string()
}
