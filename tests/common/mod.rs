//! Shared fixtures for integration tests: an in-memory store that counts
//! round trips, an in-process cache and ready-made services over both.

#![allow(dead_code)]

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use snapshare::application::auth::AuthPolicy;
use snapshare::application::comments::NewComment;
use snapshare::application::posts::NewPost;
use snapshare::application::repos::{DeleteResult, Document, DocumentStore, Filter, RepoError};
use snapshare::application::users::NewUser;
use snapshare::application::{AppServices, Backends};
use snapshare::cache::{Cache, CacheConfig};
use snapshare::domain::entities::{CommentRecord, PostRecord, UserRecord};
use snapshare::domain::types::{Collection, Counter};
use snapshare::infra::memory::MemoryDocumentStore;
use uuid::Uuid;

pub const JWT_SECRET: &str = "integration-test-secret-0123456789";

/// Delegates to [`MemoryDocumentStore`] and counts reads and writes.
///
/// After [`CountingStore::yield_after_reads`], every read hands control back
/// to the scheduler once it has its answer, so operations joined on one task
/// interleave between their lookup and their write.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryDocumentStore,
    reads: AtomicUsize,
    writes: AtomicUsize,
    yield_reads: AtomicBool,
}

impl CountingStore {
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn len(&self, collection: Collection) -> usize {
        self.inner.len(collection)
    }

    pub fn yield_after_reads(&self) {
        self.yield_reads.store(true, Ordering::SeqCst);
    }

    fn read(&self) {
        self.reads.fetch_add(1, Ordering::SeqCst);
    }

    async fn settle(&self) {
        if self.yield_reads.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
    }

    fn write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for CountingStore {
    async fn get_by_id(
        &self,
        collection: Collection,
        id: Uuid,
    ) -> Result<Option<Document>, RepoError> {
        self.read();
        let found = self.inner.get_by_id(collection, id).await;
        self.settle().await;
        found
    }

    async fn get_one_by_query(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, RepoError> {
        self.read();
        let found = self.inner.get_one_by_query(collection, filter).await;
        self.settle().await;
        found
    }

    async fn get_many_by_query(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Document>, RepoError> {
        self.read();
        let found = self.inner.get_many_by_query(collection, filter).await;
        self.settle().await;
        found
    }

    async fn insert(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<Document, RepoError> {
        self.write();
        self.inner.insert(collection, document).await
    }

    async fn update_by_id(
        &self,
        collection: Collection,
        id: Uuid,
        patch: Document,
    ) -> Result<Option<Document>, RepoError> {
        self.write();
        self.inner.update_by_id(collection, id, patch).await
    }

    async fn delete_by_id(
        &self,
        collection: Collection,
        id: Uuid,
    ) -> Result<DeleteResult, RepoError> {
        self.write();
        self.inner.delete_by_id(collection, id).await
    }

    async fn delete_many_by_query(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<DeleteResult, RepoError> {
        self.write();
        self.inner.delete_many_by_query(collection, filter).await
    }

    async fn increment_field(
        &self,
        id: Uuid,
        counter: Counter,
        delta: i64,
    ) -> Result<bool, RepoError> {
        self.write();
        self.inner.increment_field(id, counter, delta).await
    }

    async fn health_check(&self) -> Result<(), RepoError> {
        self.inner.health_check().await
    }
}

pub struct Harness {
    pub store: Arc<CountingStore>,
    pub services: AppServices,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(CountingStore::default());
        let cache = Cache::in_memory(&CacheConfig {
            memory_capacity: NonZeroUsize::new(1024).expect("non-zero capacity"),
            ..CacheConfig::default()
        });
        let backends = Backends::new(store.clone(), cache);
        Self {
            store,
            services: AppServices::new(backends, policy()),
        }
    }

    pub fn cache(&self) -> &Cache {
        &self.services.backends.cache
    }

    pub async fn user(&self, name: &str) -> UserRecord {
        self.services
            .users
            .create(NewUser {
                user_name: name.to_string(),
                email: format!("{name}@example.com"),
            })
            .await
            .expect("create user")
            .done()
            .expect("user accepted")
    }

    pub async fn post(&self, owner: Uuid) -> PostRecord {
        self.services
            .posts
            .create(NewPost {
                user_id: owner,
                img_path: format!("https://img.example.com/{}.jpg", Uuid::new_v4()),
                description: None,
            })
            .await
            .expect("create post")
            .done()
            .expect("post accepted")
    }

    pub async fn comment(&self, author: Uuid, post: Uuid, content: &str) -> CommentRecord {
        self.services
            .comments
            .create(NewComment {
                user_id: author,
                post_id: post,
                content: content.to_string(),
                user_name: None,
            })
            .await
            .expect("create comment")
            .done()
            .expect("comment accepted")
    }

    /// Reads a user through the cache.
    pub async fn reload_user(&self, id: Uuid) -> UserRecord {
        self.services
            .users
            .get_by_id(id)
            .await
            .expect("read user")
            .expect("user exists")
    }

    pub async fn reload_post(&self, id: Uuid) -> PostRecord {
        self.services
            .posts
            .get_by_id(id)
            .await
            .expect("read post")
            .expect("post exists")
    }
}

pub fn policy() -> AuthPolicy {
    AuthPolicy {
        jwt_secret: JWT_SECRET.to_string(),
        token_ttl: Duration::from_secs(6 * 60 * 60),
        attempt_threshold: 3,
        lock_duration: Duration::from_secs(300),
    }
}
