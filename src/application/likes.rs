use uuid::Uuid;

use crate::application::context::Backends;
use crate::application::error::ServiceError;
use crate::application::repos::{DeleteResult, Filter};
use crate::cache::Mutation;
use crate::domain::entities::{LikeDraft, LikeRecord, PostRecord, UserRecord};
use crate::domain::outcome::{Outcome, Rejection};
use crate::domain::types::{Collection, Field};

#[derive(Debug, Clone)]
pub struct NewLike {
    pub user_id: Uuid,
    pub post_id: Uuid,
    /// Looked up from the user record when absent.
    pub user_name: Option<String>,
}

#[derive(Clone)]
pub struct LikeService {
    backends: Backends,
}

fn relation(user_id: Uuid, post_id: Uuid) -> Filter {
    Filter::eq(Field::UserId, user_id).and_eq(Field::PostId, post_id)
}

impl LikeService {
    pub fn new(backends: Backends) -> Self {
        Self { backends }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<LikeRecord>, ServiceError> {
        Ok(self.backends.documents.find(id).await?)
    }

    /// Filters on whichever of the two ids are given; neither lists every like.
    pub async fn query(
        &self,
        user_id: Option<Uuid>,
        post_id: Option<Uuid>,
    ) -> Result<Vec<LikeRecord>, ServiceError> {
        let filter = match (user_id, post_id) {
            (Some(user_id), Some(post_id)) => relation(user_id, post_id),
            (Some(user_id), None) => Filter::eq(Field::UserId, user_id),
            (None, Some(post_id)) => Filter::eq(Field::PostId, post_id),
            (None, None) => Filter::all(),
        };
        Ok(self.backends.documents.find_many(&filter).await?)
    }

    /// The duplicate check and the insert are separate round trips; two
    /// concurrent likes of the same post by the same user can both pass.
    pub async fn create(&self, like: NewLike) -> Result<Outcome<LikeRecord>, ServiceError> {
        let existing = self
            .backends
            .documents
            .exists::<LikeRecord>(&relation(like.user_id, like.post_id))
            .await?;
        if existing.is_some() {
            return Ok(Outcome::Rejected(Rejection::AlreadyLiked));
        }

        let Some(post) = self
            .backends
            .documents
            .find::<PostRecord>(like.post_id)
            .await?
        else {
            return Ok(Outcome::Rejected(Rejection::Missing(Collection::Post)));
        };

        let user_name = match like.user_name {
            Some(name) => name,
            None => match self
                .backends
                .documents
                .find::<UserRecord>(like.user_id)
                .await?
            {
                Some(user) => user.user_name,
                None => return Ok(Outcome::Rejected(Rejection::Missing(Collection::User))),
            },
        };

        let draft = LikeDraft {
            post_id: post.id,
            user_id: like.user_id,
            user_name,
        };
        let record: LikeRecord = self.backends.documents.insert(&draft).await?;

        self.backends
            .apply(Mutation::LikeCreated {
                post_id: record.post_id,
                user_id: record.user_id,
                post_owner: Some(post.user_id),
            })
            .await?;
        Ok(Outcome::Done(record))
    }

    pub async fn delete(&self, id: Uuid) -> Result<Outcome<DeleteResult>, ServiceError> {
        let Some(like) = self.backends.documents.find::<LikeRecord>(id).await? else {
            return Ok(Outcome::Rejected(Rejection::Missing(Collection::Like)));
        };
        self.remove(like).await
    }

    pub async fn delete_by_user_and_post(
        &self,
        user_id: Uuid,
        post_id: Uuid,
    ) -> Result<Outcome<DeleteResult>, ServiceError> {
        let Some(like) = self
            .backends
            .documents
            .exists::<LikeRecord>(&relation(user_id, post_id))
            .await?
        else {
            return Ok(Outcome::Rejected(Rejection::Missing(Collection::Like)));
        };
        self.remove(like).await
    }

    async fn remove(&self, like: LikeRecord) -> Result<Outcome<DeleteResult>, ServiceError> {
        let result = self.backends.documents.delete::<LikeRecord>(like.id).await?;
        if result.deleted_count == 0 {
            return Ok(Outcome::Rejected(Rejection::Missing(Collection::Like)));
        }
        let post_owner = self
            .backends
            .documents
            .find::<PostRecord>(like.post_id)
            .await?
            .map(|post| post.user_id);

        self.backends
            .apply(Mutation::LikeDeleted {
                post_id: like.post_id,
                user_id: like.user_id,
                post_owner,
            })
            .await?;
        Ok(Outcome::Done(result))
    }
}
