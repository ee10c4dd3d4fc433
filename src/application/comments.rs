use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::context::Backends;
use crate::application::error::ServiceError;
use crate::application::repos::{DeleteResult, Filter};
use crate::cache::{CacheKey, Mutation};
use crate::domain::entities::{CommentDraft, CommentRecord, PostRecord, UserRecord};
use crate::domain::error::DomainError;
use crate::domain::outcome::{Outcome, Rejection};
use crate::domain::types::{Collection, Field};

#[derive(Debug, Clone)]
pub struct NewComment {
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub content: String,
    /// Looked up from the user record when absent.
    pub user_name: Option<String>,
}

#[derive(Clone)]
pub struct CommentService {
    backends: Backends,
}

impl CommentService {
    pub fn new(backends: Backends) -> Self {
        Self { backends }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<CommentRecord>, ServiceError> {
        Ok(self.backends.documents.find(id).await?)
    }

    pub async fn get_by_post(&self, post_id: Uuid) -> Result<Vec<CommentRecord>, ServiceError> {
        self.backends
            .cached_many(
                CacheKey::CommentsByPost(post_id),
                Filter::eq(Field::PostId, post_id),
            )
            .await
    }

    /// Served from the post's cached comment list.
    pub async fn get_by_user_and_post(
        &self,
        user_id: Uuid,
        post_id: Uuid,
    ) -> Result<Vec<CommentRecord>, ServiceError> {
        let mut comments = self.get_by_post(post_id).await?;
        comments.retain(|comment| comment.user_id == user_id);
        Ok(comments)
    }

    pub async fn get_by_user(&self, user_id: Uuid) -> Result<Vec<CommentRecord>, ServiceError> {
        Ok(self
            .backends
            .documents
            .find_many(&Filter::eq(Field::UserId, user_id))
            .await?)
    }

    pub async fn get_all(&self) -> Result<Vec<CommentRecord>, ServiceError> {
        Ok(self.backends.documents.find_many(&Filter::all()).await?)
    }

    pub async fn create(&self, comment: NewComment) -> Result<Outcome<CommentRecord>, ServiceError> {
        if comment.content.trim().is_empty() {
            return Err(DomainError::validation("comment content must not be empty").into());
        }

        let Some(post) = self
            .backends
            .documents
            .find::<PostRecord>(comment.post_id)
            .await?
        else {
            return Ok(Outcome::Rejected(Rejection::Missing(Collection::Post)));
        };

        let user_name = match comment.user_name {
            Some(name) => name,
            None => match self
                .backends
                .documents
                .find::<UserRecord>(comment.user_id)
                .await?
            {
                Some(user) => user.user_name,
                None => return Ok(Outcome::Rejected(Rejection::Missing(Collection::User))),
            },
        };

        let draft = CommentDraft {
            user_id: comment.user_id,
            user_name,
            post_id: post.id,
            content: comment.content,
            timestamp: OffsetDateTime::now_utc(),
        };
        let record: CommentRecord = self.backends.documents.insert(&draft).await?;

        self.backends
            .apply(Mutation::CommentCreated {
                post_id: record.post_id,
                user_id: record.user_id,
                post_owner: Some(post.user_id),
            })
            .await?;
        Ok(Outcome::Done(record))
    }

    pub async fn delete(&self, id: Uuid) -> Result<Outcome<DeleteResult>, ServiceError> {
        let Some(comment) = self.backends.documents.find::<CommentRecord>(id).await? else {
            return Ok(Outcome::Rejected(Rejection::Missing(Collection::Comment)));
        };
        self.remove(comment).await
    }

    pub async fn delete_by_user_and_post(
        &self,
        user_id: Uuid,
        post_id: Uuid,
    ) -> Result<Outcome<DeleteResult>, ServiceError> {
        let filter = Filter::eq(Field::UserId, user_id).and_eq(Field::PostId, post_id);
        let Some(comment) = self.backends.documents.exists::<CommentRecord>(&filter).await? else {
            return Ok(Outcome::Rejected(Rejection::Missing(Collection::Comment)));
        };
        self.remove(comment).await
    }

    async fn remove(
        &self,
        comment: CommentRecord,
    ) -> Result<Outcome<DeleteResult>, ServiceError> {
        let result = self
            .backends
            .documents
            .delete::<CommentRecord>(comment.id)
            .await?;
        if result.deleted_count == 0 {
            return Ok(Outcome::Rejected(Rejection::Missing(Collection::Comment)));
        }
        let post_owner = self
            .backends
            .documents
            .find::<PostRecord>(comment.post_id)
            .await?
            .map(|post| post.user_id);

        self.backends
            .apply(Mutation::CommentDeleted {
                post_id: comment.post_id,
                user_id: comment.user_id,
                post_owner,
            })
            .await?;
        Ok(Outcome::Done(result))
    }
}
