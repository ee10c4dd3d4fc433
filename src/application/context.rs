//! Shared backends handed to every entity service.

use std::sync::Arc;

use uuid::Uuid;

use crate::application::auth::{AuthPolicy, AuthService};
use crate::application::comments::CommentService;
use crate::application::error::ServiceError;
use crate::application::followings::FollowingService;
use crate::application::hides::HideService;
use crate::application::likes::LikeService;
use crate::application::posts::PostService;
use crate::application::repos::{DocumentStore, Documents, Filter};
use crate::application::users::UserService;
use crate::cache::{Cache, CacheKey, ENTITY_CACHE_TTL, InvalidationEngine, Mutation};
use crate::domain::entities::Entity;

#[derive(Clone)]
pub struct Backends {
    pub documents: Documents,
    pub cache: Cache,
    pub engine: InvalidationEngine,
}

impl Backends {
    pub fn new(store: Arc<dyn DocumentStore>, cache: Cache) -> Self {
        Self {
            documents: Documents::new(store.clone()),
            engine: InvalidationEngine::new(store, cache.clone()),
            cache,
        }
    }

    /// Single entity through `key`; absent entities are not cached.
    pub(crate) async fn cached_one<T: Entity>(
        &self,
        key: CacheKey,
        id: Uuid,
    ) -> Result<Option<T>, ServiceError> {
        self.cache
            .read_through_optional(&key, ENTITY_CACHE_TTL, || async move {
                self.documents.find::<T>(id).await.map_err(ServiceError::from)
            })
            .await
    }

    /// Collection through `key`; an empty result is cached like any other.
    pub(crate) async fn cached_many<T: Entity>(
        &self,
        key: CacheKey,
        filter: Filter,
    ) -> Result<Vec<T>, ServiceError> {
        self.cache
            .read_through(&key, ENTITY_CACHE_TTL, || async move {
                self.documents
                    .find_many::<T>(&filter)
                    .await
                    .map_err(ServiceError::from)
            })
            .await
    }

    pub(crate) async fn apply(&self, mutation: Mutation) -> Result<(), ServiceError> {
        self.engine.apply(&mutation).await?;
        Ok(())
    }
}

/// Every entity service over one set of backends.
#[derive(Clone)]
pub struct AppServices {
    pub backends: Backends,
    pub users: Arc<UserService>,
    pub posts: Arc<PostService>,
    pub comments: Arc<CommentService>,
    pub likes: Arc<LikeService>,
    pub followings: Arc<FollowingService>,
    pub hides: Arc<HideService>,
    pub auth: Arc<AuthService>,
}

impl AppServices {
    pub fn new(backends: Backends, policy: AuthPolicy) -> Self {
        let users = UserService::new(backends.clone());
        Self {
            auth: Arc::new(AuthService::new(backends.clone(), users.clone(), policy)),
            users: Arc::new(users),
            posts: Arc::new(PostService::new(backends.clone())),
            comments: Arc::new(CommentService::new(backends.clone())),
            likes: Arc::new(LikeService::new(backends.clone())),
            followings: Arc::new(FollowingService::new(backends.clone())),
            hides: Arc::new(HideService::new(backends.clone())),
            backends,
        }
    }
}
