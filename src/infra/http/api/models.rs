use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::UserRecord;

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub user_name: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserRecord,
    pub access_token: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub success: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub result: &'static str,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreateRequest {
    pub user_name: String,
    pub email: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatchRequest {
    pub user_motto: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCreateRequest {
    #[serde(rename = "userID")]
    pub user_id: Uuid,
    pub img_path: String,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPatchRequest {
    pub img_path: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentCreateRequest {
    #[serde(rename = "userID")]
    pub user_id: Uuid,
    #[serde(rename = "postID")]
    pub post_id: Uuid,
    pub content: String,
    pub user_name: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeCreateRequest {
    #[serde(rename = "userID")]
    pub user_id: Uuid,
    #[serde(rename = "postID")]
    pub post_id: Uuid,
    pub user_name: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowingCreateRequest {
    #[serde(rename = "followerID")]
    pub follower_id: Uuid,
    #[serde(rename = "followingID")]
    pub following_id: Uuid,
    pub follower_name: Option<String>,
    pub following_name: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct HideCreateRequest {
    #[serde(rename = "userID")]
    pub user_id: Uuid,
    #[serde(rename = "postID")]
    pub post_id: Uuid,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListQuery {
    pub user_name: Option<String>,
    pub user_name_like: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PostListQuery {
    #[serde(rename = "userID")]
    pub user_id: Option<Uuid>,
    #[serde(rename = "userName")]
    pub user_name: Option<String>,
}

/// `?userID=&postID=` filters shared by comments, likes and hides.
#[derive(Debug, Default, Deserialize)]
pub struct UserPostQuery {
    #[serde(rename = "userID")]
    pub user_id: Option<Uuid>,
    #[serde(rename = "postID")]
    pub post_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FollowingQuery {
    #[serde(rename = "followerID")]
    pub follower_id: Option<Uuid>,
    #[serde(rename = "followingID")]
    pub following_id: Option<Uuid>,
}
