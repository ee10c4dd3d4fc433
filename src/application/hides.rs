use uuid::Uuid;

use crate::application::context::Backends;
use crate::application::error::ServiceError;
use crate::application::repos::{DeleteResult, Filter};
use crate::cache::{CacheKey, Mutation};
use crate::domain::entities::{HideDraft, HideRecord, PostRecord};
use crate::domain::outcome::{Outcome, Rejection};
use crate::domain::types::{Collection, Field};

#[derive(Clone)]
pub struct HideService {
    backends: Backends,
}

impl HideService {
    pub fn new(backends: Backends) -> Self {
        Self { backends }
    }

    /// Cached under `hide:{id}`, which no mutation invalidates: a deleted hide
    /// keeps being served from the cache until its entry expires.
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<HideRecord>, ServiceError> {
        self.backends.cached_one(CacheKey::Hide(id), id).await
    }

    pub async fn get_by_user(&self, user_id: Uuid) -> Result<Vec<HideRecord>, ServiceError> {
        self.backends
            .cached_many(
                CacheKey::HidesByUser(user_id),
                Filter::eq(Field::UserId, user_id),
            )
            .await
    }

    pub async fn get_all(&self) -> Result<Vec<HideRecord>, ServiceError> {
        Ok(self.backends.documents.find_many(&Filter::all()).await?)
    }

    /// Ownership is checked against the hider's cached post list.
    pub async fn create(
        &self,
        user_id: Uuid,
        post_id: Uuid,
    ) -> Result<Outcome<HideRecord>, ServiceError> {
        let own_posts: Vec<PostRecord> = self
            .backends
            .cached_many(
                CacheKey::PostsByUser(user_id),
                Filter::eq(Field::UserId, user_id),
            )
            .await?;
        if own_posts.iter().any(|post| post.id == post_id) {
            return Ok(Outcome::Rejected(Rejection::HideOwnPost));
        }

        let record: HideRecord = self
            .backends
            .documents
            .insert(&HideDraft { user_id, post_id })
            .await?;
        self.backends
            .apply(Mutation::HideCreated {
                user_id: record.user_id,
            })
            .await?;
        Ok(Outcome::Done(record))
    }

    pub async fn delete(&self, id: Uuid) -> Result<Outcome<DeleteResult>, ServiceError> {
        let Some(hide) = self.backends.documents.find::<HideRecord>(id).await? else {
            return Ok(Outcome::Rejected(Rejection::Missing(Collection::Hide)));
        };
        self.remove(hide).await
    }

    pub async fn delete_by_user_and_post(
        &self,
        user_id: Uuid,
        post_id: Uuid,
    ) -> Result<Outcome<DeleteResult>, ServiceError> {
        let filter = Filter::eq(Field::UserId, user_id).and_eq(Field::PostId, post_id);
        let Some(hide) = self.backends.documents.exists::<HideRecord>(&filter).await? else {
            return Ok(Outcome::Rejected(Rejection::Missing(Collection::Hide)));
        };
        self.remove(hide).await
    }

    async fn remove(&self, hide: HideRecord) -> Result<Outcome<DeleteResult>, ServiceError> {
        let result = self.backends.documents.delete::<HideRecord>(hide.id).await?;
        if result.deleted_count == 0 {
            return Ok(Outcome::Rejected(Rejection::Missing(Collection::Hide)));
        }
        self.backends
            .apply(Mutation::HideDeleted {
                user_id: hide.user_id,
            })
            .await?;
        Ok(Outcome::Done(result))
    }
}
