use async_trait::async_trait;
use serde_json::Value;
use sqlx::{Postgres, QueryBuilder, query, query_scalar, types::Json};
use uuid::Uuid;

use crate::application::repos::{
    DeleteResult, Document, DocumentStore, Filter, ID_FIELD, RepoError, document_id,
};
use crate::domain::types::{Collection, Counter};

use super::PostgresRepositories;
use super::util::{map_sqlx_error, push_filter};

fn select_bodies<'q>(collection: Collection) -> QueryBuilder<'q, Postgres> {
    let mut qb = QueryBuilder::new("SELECT body FROM documents WHERE collection = ");
    qb.push_bind(collection.as_str());
    qb
}

#[async_trait]
impl DocumentStore for PostgresRepositories {
    async fn get_by_id(
        &self,
        collection: Collection,
        id: Uuid,
    ) -> Result<Option<Document>, RepoError> {
        let body = query_scalar::<_, Json<Document>>(
            "SELECT body FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection.as_str())
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(body.map(|Json(document)| document))
    }

    async fn get_one_by_query(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, RepoError> {
        let mut qb = select_bodies(collection);
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY created_at LIMIT 1");

        let body = qb
            .build_query_scalar::<Json<Document>>()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(body.map(|Json(document)| document))
    }

    async fn get_many_by_query(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Document>, RepoError> {
        let mut qb = select_bodies(collection);
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY created_at");

        let bodies = qb
            .build_query_scalar::<Json<Document>>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(bodies.into_iter().map(|Json(document)| document).collect())
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

        query("INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)")
            .bind(collection.as_str())
            .bind(id)
            .bind(Json(&document))
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(document)
    }

    async fn update_by_id(
        &self,
        collection: Collection,
        id: Uuid,
        mut patch: Document,
    ) -> Result<Option<Document>, RepoError> {
        patch.remove(ID_FIELD);

        let body = query_scalar::<_, Json<Document>>(
            "UPDATE documents SET body = body || $3 \
             WHERE collection = $1 AND id = $2 RETURNING body",
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(Json(&patch))
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(body.map(|Json(document)| document))
    }

    async fn delete_by_id(
        &self,
        collection: Collection,
        id: Uuid,
    ) -> Result<DeleteResult, RepoError> {
        let result = query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection.as_str())
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(DeleteResult::new(result.rows_affected()))
    }

    async fn delete_many_by_query(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<DeleteResult, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM documents WHERE collection = ");
        qb.push_bind(collection.as_str());
        push_filter(&mut qb, filter);

        let result = qb
            .build()
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(DeleteResult::new(result.rows_affected()))
    }

    async fn increment_field(
        &self,
        id: Uuid,
        counter: Counter,
        delta: i64,
    ) -> Result<bool, RepoError> {
        let result = query(
            "UPDATE documents \
             SET body = jsonb_set(body, ARRAY[$3::text], \
                 to_jsonb(COALESCE((body ->> $3::text)::bigint, 0) + $4)) \
             WHERE collection = $1 AND id = $2",
        )
        .bind(counter.collection().as_str())
        .bind(id)
        .bind(counter.field_name())
        .bind(delta)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<(), RepoError> {
        self.ping().await.map_err(map_sqlx_error)
    }
}
