use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::application::context::Backends;
use crate::application::error::ServiceError;
use crate::application::repos::{DeleteResult, Filter};
use crate::cache::{CacheKey, Mutation};
use crate::domain::entities::{UserDraft, UserRecord};
use crate::domain::error::DomainError;
use crate::domain::outcome::{Outcome, Rejection};
use crate::domain::types::{Collection, Field};

#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_name: String,
    pub email: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MottoPatch<'a> {
    user_motto: &'a str,
}

#[derive(Clone)]
pub struct UserService {
    backends: Backends,
}

impl UserService {
    pub fn new(backends: Backends) -> Self {
        Self { backends }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, ServiceError> {
        self.backends.cached_one(CacheKey::User(id), id).await
    }

    pub async fn find_by_user_name(&self, user_name: &str) -> Result<Vec<UserRecord>, ServiceError> {
        Ok(self
            .backends
            .documents
            .find_many(&Filter::eq(Field::UserName, user_name))
            .await?)
    }

    /// Case-insensitive user-name prefix search.
    pub async fn search_by_prefix(&self, prefix: &str) -> Result<Vec<UserRecord>, ServiceError> {
        Ok(self
            .backends
            .documents
            .find_many(&Filter::starts_with(Field::UserName, prefix))
            .await?)
    }

    pub async fn get_all(&self) -> Result<Vec<UserRecord>, ServiceError> {
        Ok(self.backends.documents.find_many(&Filter::all()).await?)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, ServiceError> {
        Ok(self
            .backends
            .documents
            .find_one(&Filter::eq(Field::Email, email))
            .await?)
    }

    pub async fn create(&self, user: NewUser) -> Result<Outcome<UserRecord>, ServiceError> {
        let user_name = user.user_name.trim();
        let email = user.email.trim();
        if user_name.is_empty() || email.is_empty() {
            return Err(DomainError::validation("userName and email are required").into());
        }

        if self.find_by_email(email).await?.is_some() {
            return Ok(Outcome::Rejected(Rejection::EmailTaken));
        }
        if !self.find_by_user_name(user_name).await?.is_empty() {
            return Ok(Outcome::Rejected(Rejection::UserNameTaken));
        }

        let draft = UserDraft::new(user_name.to_string(), email.to_string());
        let record: UserRecord = self.backends.documents.insert(&draft).await?;
        info!(target = "snapshare::users", user_id = %record.id, "User created");
        Ok(Outcome::Done(record))
    }

    pub async fn update_motto(
        &self,
        id: Uuid,
        motto: &str,
    ) -> Result<Outcome<UserRecord>, ServiceError> {
        let patch = MottoPatch { user_motto: motto };
        let Some(updated) = self
            .backends
            .documents
            .update::<UserRecord>(id, &patch)
            .await?
        else {
            return Ok(Outcome::Rejected(Rejection::Missing(Collection::User)));
        };

        self.backends
            .apply(Mutation::UserUpdated { user_id: id })
            .await?;
        Ok(Outcome::Done(updated))
    }

    /// Removes the user together with everything it owns except hides.
    pub async fn delete(&self, id: Uuid) -> Result<Outcome<DeleteResult>, ServiceError> {
        let Some(user) = self.backends.documents.find::<UserRecord>(id).await? else {
            return Ok(Outcome::Rejected(Rejection::Missing(Collection::User)));
        };

        self.backends
            .apply(Mutation::UserDeleted {
                user_id: user.id,
                email: user.email,
            })
            .await?;
        info!(target = "snapshare::users", user_id = %id, "User deleted");
        Ok(Outcome::Done(DeleteResult::new(1)))
    }
}
