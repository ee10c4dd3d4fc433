//! In-process document store used by tests and by `serve` without a database URL.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::application::repos::{
    Condition, DeleteResult, Document, DocumentStore, Filter, ID_FIELD, RepoError, document_id,
};
use crate::cache::lock::{rw_read, rw_write};
use crate::domain::types::{Collection, Counter, Field};

const SOURCE: &str = "infra::memory";

type Table = BTreeMap<Uuid, Document>;

#[derive(Default)]
pub struct MemoryDocumentStore {
    tables: RwLock<HashMap<Collection, Table>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently stored in `collection`.
    pub fn len(&self, collection: Collection) -> usize {
        rw_read(&self.tables, SOURCE, "len")
            .get(&collection)
            .map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self, collection: Collection) -> bool {
        self.len(collection) == 0
    }

    fn id_only(filter: &Filter) -> Option<Uuid> {
        match filter.clauses() {
            [clause] => match clause.as_slice() {
                [Condition::Equals(Field::Id, raw)] => Uuid::parse_str(raw).ok(),
                _ => None,
            },
            _ => None,
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get_by_id(
        &self,
        collection: Collection,
        id: Uuid,
    ) -> Result<Option<Document>, RepoError> {
        Ok(rw_read(&self.tables, SOURCE, "get_by_id")
            .get(&collection)
            .and_then(|table| table.get(&id))
            .cloned())
    }

    async fn get_one_by_query(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, RepoError> {
        if let Some(id) = Self::id_only(filter) {
            return self.get_by_id(collection, id).await;
        }
        Ok(rw_read(&self.tables, SOURCE, "get_one_by_query")
            .get(&collection)
            .and_then(|table| table.values().find(|doc| filter.matches(doc)))
            .cloned())
    }

    async fn get_many_by_query(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Document>, RepoError> {
        Ok(rw_read(&self.tables, SOURCE, "get_many_by_query")
            .get(&collection)
            .map(|table| {
                table
                    .values()
                    .filter(|doc| filter.matches(doc))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert(
        &self,
        collection: Collection,
        mut document: Document,
    ) -> Result<Document, RepoError> {
        let id = match document.get(ID_FIELD) {
            None => Uuid::new_v4(),
            Some(_) => document_id(&document).ok_or_else(|| RepoError::InvalidInput {
                message: format!("{collection} document has a malformed `_id`"),
            })?,
        };
        document.insert(ID_FIELD.to_string(), Value::String(id.to_string()));

        let mut tables = rw_write(&self.tables, SOURCE, "insert");
        let table = tables.entry(collection).or_default();
        if table.contains_key(&id) {
            return Err(RepoError::Duplicate {
                constraint: format!("{collection}_pkey"),
            });
        }
        table.insert(id, document.clone());
        Ok(document)
    }

    async fn update_by_id(
        &self,
        collection: Collection,
        id: Uuid,
        patch: Document,
    ) -> Result<Option<Document>, RepoError> {
        let mut tables = rw_write(&self.tables, SOURCE, "update_by_id");
        let Some(document) = tables.get_mut(&collection).and_then(|t| t.get_mut(&id)) else {
            return Ok(None);
        };
        for (key, value) in patch {
            if key != ID_FIELD {
                document.insert(key, value);
            }
        }
        Ok(Some(document.clone()))
    }

    async fn delete_by_id(
        &self,
        collection: Collection,
        id: Uuid,
    ) -> Result<DeleteResult, RepoError> {
        let removed = rw_write(&self.tables, SOURCE, "delete_by_id")
            .get_mut(&collection)
            .and_then(|table| table.remove(&id));
        Ok(DeleteResult::new(u64::from(removed.is_some())))
    }

    async fn delete_many_by_query(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<DeleteResult, RepoError> {
        let mut tables = rw_write(&self.tables, SOURCE, "delete_many_by_query");
        let Some(table) = tables.get_mut(&collection) else {
            return Ok(DeleteResult::default());
        };
        let before = table.len();
        table.retain(|_, doc| !filter.matches(doc));
        Ok(DeleteResult::new((before - table.len()) as u64))
    }

    async fn increment_field(
        &self,
        id: Uuid,
        counter: Counter,
        delta: i64,
    ) -> Result<bool, RepoError> {
        let mut tables = rw_write(&self.tables, SOURCE, "increment_field");
        let Some(document) = tables
            .get_mut(&counter.collection())
            .and_then(|table| table.get_mut(&id))
        else {
            return Ok(false);
        };
        let current = document
            .get(counter.field_name())
            .and_then(Value::as_i64)
            .unwrap_or(0);
        document.insert(
            counter.field_name().to_string(),
            Value::from(current + delta),
        );
        Ok(true)
    }

    async fn health_check(&self) -> Result<(), RepoError> {
        Ok(())
    }
}
