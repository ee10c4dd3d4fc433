use uuid::Uuid;

use crate::application::context::Backends;
use crate::application::error::ServiceError;
use crate::application::repos::{DeleteResult, Filter};
use crate::cache::{CacheKey, Mutation};
use crate::domain::entities::{FollowingDraft, FollowingRecord, UserRecord};
use crate::domain::outcome::{Outcome, Rejection};
use crate::domain::types::{Collection, Field};

#[derive(Debug, Clone)]
pub struct NewFollowing {
    pub follower_id: Uuid,
    pub following_id: Uuid,
    pub follower_name: Option<String>,
    pub following_name: Option<String>,
}

#[derive(Clone)]
pub struct FollowingService {
    backends: Backends,
}

fn relation(follower_id: Uuid, following_id: Uuid) -> Filter {
    Filter::eq(Field::FollowerId, follower_id).and_eq(Field::FollowingId, following_id)
}

impl FollowingService {
    pub fn new(backends: Backends) -> Self {
        Self { backends }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<FollowingRecord>, ServiceError> {
        Ok(self.backends.documents.find(id).await?)
    }

    /// Everyone `follower_id` follows.
    pub async fn get_by_follower(
        &self,
        follower_id: Uuid,
    ) -> Result<Vec<FollowingRecord>, ServiceError> {
        self.backends
            .cached_many(
                CacheKey::FollowingsByFollower(follower_id),
                Filter::eq(Field::FollowerId, follower_id),
            )
            .await
    }

    /// Everyone following `following_id`.
    pub async fn get_by_following(
        &self,
        following_id: Uuid,
    ) -> Result<Vec<FollowingRecord>, ServiceError> {
        Ok(self
            .backends
            .documents
            .find_many(&Filter::eq(Field::FollowingId, following_id))
            .await?)
    }

    pub async fn get_by_pair(
        &self,
        follower_id: Uuid,
        following_id: Uuid,
    ) -> Result<Vec<FollowingRecord>, ServiceError> {
        let mut followings = self.get_by_follower(follower_id).await?;
        followings.retain(|following| following.following_id == following_id);
        Ok(followings)
    }

    pub async fn get_all(&self) -> Result<Vec<FollowingRecord>, ServiceError> {
        Ok(self.backends.documents.find_many(&Filter::all()).await?)
    }

    pub async fn create(
        &self,
        following: NewFollowing,
    ) -> Result<Outcome<FollowingRecord>, ServiceError> {
        if following.follower_id == following.following_id {
            return Ok(Outcome::Rejected(Rejection::SelfFollow));
        }

        let existing = self
            .backends
            .documents
            .exists::<FollowingRecord>(&relation(following.follower_id, following.following_id))
            .await?;
        if existing.is_some() {
            return Ok(Outcome::Rejected(Rejection::AlreadyFollowing));
        }

        let Some(follower_name) = self
            .name_of(following.follower_id, following.follower_name)
            .await?
        else {
            return Ok(Outcome::Rejected(Rejection::Missing(Collection::User)));
        };
        let Some(following_name) = self
            .name_of(following.following_id, following.following_name)
            .await?
        else {
            return Ok(Outcome::Rejected(Rejection::Missing(Collection::User)));
        };

        let draft = FollowingDraft {
            follower_id: following.follower_id,
            follower_name,
            following_id: following.following_id,
            following_name,
        };
        let record: FollowingRecord = self.backends.documents.insert(&draft).await?;

        self.backends
            .apply(Mutation::FollowingCreated {
                follower_id: record.follower_id,
                following_id: record.following_id,
            })
            .await?;
        Ok(Outcome::Done(record))
    }

    pub async fn delete(&self, id: Uuid) -> Result<Outcome<DeleteResult>, ServiceError> {
        let Some(following) = self
            .backends
            .documents
            .find::<FollowingRecord>(id)
            .await?
        else {
            return Ok(Outcome::Rejected(Rejection::Missing(Collection::Following)));
        };
        self.remove(following).await
    }

    pub async fn delete_by_pair(
        &self,
        follower_id: Uuid,
        following_id: Uuid,
    ) -> Result<Outcome<DeleteResult>, ServiceError> {
        let Some(following) = self
            .backends
            .documents
            .exists::<FollowingRecord>(&relation(follower_id, following_id))
            .await?
        else {
            return Ok(Outcome::Rejected(Rejection::Missing(Collection::Following)));
        };
        self.remove(following).await
    }

    async fn remove(
        &self,
        following: FollowingRecord,
    ) -> Result<Outcome<DeleteResult>, ServiceError> {
        let result = self
            .backends
            .documents
            .delete::<FollowingRecord>(following.id)
            .await?;
        if result.deleted_count == 0 {
            return Ok(Outcome::Rejected(Rejection::Missing(Collection::Following)));
        }
        self.backends
            .apply(Mutation::FollowingDeleted {
                follower_id: following.follower_id,
                following_id: following.following_id,
            })
            .await?;
        Ok(Outcome::Done(result))
    }

    async fn name_of(
        &self,
        user_id: Uuid,
        supplied: Option<String>,
    ) -> Result<Option<String>, ServiceError> {
        if let Some(name) = supplied {
            return Ok(Some(name));
        }
        Ok(self
            .backends
            .documents
            .find::<UserRecord>(user_id)
            .await?
            .map(|user| user.user_name))
    }
}
