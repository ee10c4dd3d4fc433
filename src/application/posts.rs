use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::context::Backends;
use crate::application::error::ServiceError;
use crate::application::repos::{DeleteResult, Filter};
use crate::cache::{CacheKey, Mutation};
use crate::domain::entities::{DEFAULT_DESCRIPTION, PostDraft, PostRecord, UserRecord};
use crate::domain::outcome::{Outcome, Rejection};
use crate::domain::types::{Collection, Field};

#[derive(Debug, Clone)]
pub struct NewPost {
    pub user_id: Uuid,
    pub img_path: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Clone)]
pub struct PostService {
    backends: Backends,
}

impl PostService {
    pub fn new(backends: Backends) -> Self {
        Self { backends }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<PostRecord>, ServiceError> {
        self.backends.cached_one(CacheKey::Post(id), id).await
    }

    pub async fn get_by_user(&self, user_id: Uuid) -> Result<Vec<PostRecord>, ServiceError> {
        self.backends
            .cached_many(
                CacheKey::PostsByUser(user_id),
                Filter::eq(Field::UserId, user_id),
            )
            .await
    }

    pub async fn get_by_user_name(&self, user_name: &str) -> Result<Vec<PostRecord>, ServiceError> {
        Ok(self
            .backends
            .documents
            .find_many(&Filter::eq(Field::UserName, user_name))
            .await?)
    }

    pub async fn get_all(&self) -> Result<Vec<PostRecord>, ServiceError> {
        Ok(self.backends.documents.find_many(&Filter::all()).await?)
    }

    pub async fn create(&self, post: NewPost) -> Result<Outcome<PostRecord>, ServiceError> {
        let Some(author) = self
            .backends
            .documents
            .find::<UserRecord>(post.user_id)
            .await?
        else {
            return Ok(Outcome::Rejected(Rejection::Missing(Collection::User)));
        };

        let draft = PostDraft {
            user_id: author.id,
            user_name: author.user_name,
            img_path: post.img_path,
            description: post
                .description
                .filter(|text| !text.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            like_count: 0,
            comment_count: 0,
            timestamp: OffsetDateTime::now_utc(),
        };
        let record: PostRecord = self.backends.documents.insert(&draft).await?;

        self.backends
            .apply(Mutation::PostCreated {
                post_id: record.id,
                user_id: record.user_id,
            })
            .await?;
        Ok(Outcome::Done(record))
    }

    pub async fn update(
        &self,
        id: Uuid,
        patch: &PostPatch,
    ) -> Result<Outcome<PostRecord>, ServiceError> {
        let Some(updated) = self
            .backends
            .documents
            .update::<PostRecord>(id, patch)
            .await?
        else {
            return Ok(Outcome::Rejected(Rejection::Missing(Collection::Post)));
        };

        self.backends
            .apply(Mutation::PostUpdated {
                post_id: updated.id,
                user_id: updated.user_id,
            })
            .await?;
        Ok(Outcome::Done(updated))
    }

    pub async fn delete(&self, id: Uuid) -> Result<Outcome<DeleteResult>, ServiceError> {
        let Some(post) = self.backends.documents.find::<PostRecord>(id).await? else {
            return Ok(Outcome::Rejected(Rejection::Missing(Collection::Post)));
        };

        let result = self.backends.documents.delete::<PostRecord>(id).await?;
        if result.deleted_count == 0 {
            return Ok(Outcome::Rejected(Rejection::Missing(Collection::Post)));
        }
        self.backends
            .apply(Mutation::PostDeleted {
                post_id: post.id,
                user_id: post.user_id,
            })
            .await?;
        Ok(Outcome::Done(result))
    }
}
