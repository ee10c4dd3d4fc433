//! Document store trait describing persistence adapters.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::entities::Entity;
use crate::domain::types::{Collection, Counter, Field};

/// A stored document: a JSON object whose `_id` is assigned on insert.
pub type Document = serde_json::Map<String, Value>;

pub const ID_FIELD: &str = "_id";

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
    #[error("document in `{collection}` could not be decoded: {message}")]
    Decode {
        collection: Collection,
        message: String,
    },
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Equals(Field, String),
    /// Case-insensitive prefix match.
    StartsWith(Field, String),
}

impl Condition {
    pub fn field(&self) -> Field {
        match self {
            Condition::Equals(field, _) | Condition::StartsWith(field, _) => *field,
        }
    }

    fn matches(&self, document: &Document) -> bool {
        let Some(actual) = document.get(self.field().as_str()).and_then(scalar_text) else {
            return false;
        };
        match self {
            Condition::Equals(_, expected) => actual == *expected,
            Condition::StartsWith(_, prefix) => actual
                .to_lowercase()
                .starts_with(prefix.to_lowercase().as_str()),
        }
    }
}

/// Disjunction of conjunctive equality clauses. No clauses matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    any_of: Vec<Vec<Condition>>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(field: Field, value: impl ToString) -> Self {
        Self {
            any_of: vec![vec![Condition::Equals(field, value.to_string())]],
        }
    }

    pub fn starts_with(field: Field, prefix: impl Into<String>) -> Self {
        Self {
            any_of: vec![vec![Condition::StartsWith(field, prefix.into())]],
        }
    }

    /// Adds an equality to every clause.
    pub fn and_eq(mut self, field: Field, value: impl ToString) -> Self {
        let condition = Condition::Equals(field, value.to_string());
        if self.any_of.is_empty() {
            self.any_of.push(vec![condition]);
        } else {
            for clause in &mut self.any_of {
                clause.push(condition.clone());
            }
        }
        self
    }

    pub fn or(mut self, other: Filter) -> Self {
        if self.any_of.is_empty() || other.any_of.is_empty() {
            return Filter::all();
        }
        self.any_of.extend(other.any_of);
        self
    }

    pub fn clauses(&self) -> &[Vec<Condition>] {
        &self.any_of
    }

    pub fn is_all(&self) -> bool {
        self.any_of.is_empty()
    }

    pub fn matches(&self, document: &Document) -> bool {
        self.any_of.is_empty()
            || self
                .any_of
                .iter()
                .any(|clause| clause.iter().all(|condition| condition.matches(document)))
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeleteResult {
    #[serde(rename = "deletedCount")]
    pub deleted_count: u64,
}

impl DeleteResult {
    pub fn new(deleted_count: u64) -> Self {
        Self { deleted_count }
    }
}

/// Persistence for the entity collections. Every call is an independent
/// round trip; there is no multi-document transaction.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_by_id(&self, collection: Collection, id: Uuid)
    -> Result<Option<Document>, RepoError>;

    async fn get_one_by_query(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, RepoError>;

    /// Order is not guaranteed.
    async fn get_many_by_query(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Document>, RepoError>;

    /// Stores the document, assigning `_id` when absent.
    async fn insert(&self, collection: Collection, document: Document)
    -> Result<Document, RepoError>;

    /// Shallow-merges `patch` into the stored document.
    async fn update_by_id(
        &self,
        collection: Collection,
        id: Uuid,
        patch: Document,
    ) -> Result<Option<Document>, RepoError>;

    async fn delete_by_id(&self, collection: Collection, id: Uuid)
    -> Result<DeleteResult, RepoError>;

    async fn delete_many_by_query(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<DeleteResult, RepoError>;

    /// Atomically adds `delta` to a counter on one document of
    /// `counter.collection()`. Returns whether a document was updated.
    async fn increment_field(
        &self,
        id: Uuid,
        counter: Counter,
        delta: i64,
    ) -> Result<bool, RepoError>;

    async fn exists_by_query(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, RepoError> {
        self.get_one_by_query(collection, filter).await
    }

    async fn health_check(&self) -> Result<(), RepoError>;
}

/// Typed access to a [`DocumentStore`].
#[derive(Clone)]
pub struct Documents {
    store: Arc<dyn DocumentStore>,
}

impl Documents {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub async fn find<T: Entity>(&self, id: Uuid) -> Result<Option<T>, RepoError> {
        self.store
            .get_by_id(T::COLLECTION, id)
            .await?
            .map(decode::<T>)
            .transpose()
    }

    pub async fn find_one<T: Entity>(&self, filter: &Filter) -> Result<Option<T>, RepoError> {
        self.store
            .get_one_by_query(T::COLLECTION, filter)
            .await?
            .map(decode::<T>)
            .transpose()
    }

    pub async fn find_many<T: Entity>(&self, filter: &Filter) -> Result<Vec<T>, RepoError> {
        self.store
            .get_many_by_query(T::COLLECTION, filter)
            .await?
            .into_iter()
            .map(decode::<T>)
            .collect()
    }

    pub async fn exists<T: Entity>(&self, filter: &Filter) -> Result<Option<T>, RepoError> {
        self.store
            .exists_by_query(T::COLLECTION, filter)
            .await?
            .map(decode::<T>)
            .transpose()
    }

    pub async fn insert<T: Entity>(&self, draft: &impl Serialize) -> Result<T, RepoError> {
        let document = encode(T::COLLECTION, draft)?;
        let stored = self.store.insert(T::COLLECTION, document).await?;
        decode(stored)
    }

    pub async fn update<T: Entity>(
        &self,
        id: Uuid,
        patch: &impl Serialize,
    ) -> Result<Option<T>, RepoError> {
        let mut patch = encode(T::COLLECTION, patch)?;
        patch.remove(ID_FIELD);
        self.store
            .update_by_id(T::COLLECTION, id, patch)
            .await?
            .map(decode::<T>)
            .transpose()
    }

    pub async fn delete<T: Entity>(&self, id: Uuid) -> Result<DeleteResult, RepoError> {
        self.store.delete_by_id(T::COLLECTION, id).await
    }
}

pub fn encode(collection: Collection, value: &impl Serialize) -> Result<Document, RepoError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(document)) => Ok(document),
        Ok(other) => Err(RepoError::InvalidInput {
            message: format!("{collection} document must be an object, got {other}"),
        }),
        Err(err) => Err(RepoError::InvalidInput {
            message: err.to_string(),
        }),
    }
}

pub fn decode<T: Entity>(document: Document) -> Result<T, RepoError> {
    serde_json::from_value(Value::Object(document)).map_err(|err| RepoError::Decode {
        collection: T::COLLECTION,
        message: err.to_string(),
    })
}

/// Reads `_id` from a stored document.
pub fn document_id(document: &Document) -> Option<Uuid> {
    document
        .get(ID_FIELD)
        .and_then(Value::as_str)
        .and_then(|raw| Uuid::parse_str(raw).ok())
}
