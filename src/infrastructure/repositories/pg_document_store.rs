//! PostgreSQL Document Store
//!
//! Stores every collection in one `documents` table as JSONB, keyed by
//! `(collection, id)`. Filters are translated into parameterized SQL;
//! field names and values are always bound, never spliced.
//!
//! Uniqueness is enforced by partial unique indexes named
//! `<collection>__<field>__key` (see `migrations/`), so a violation can be
//! reported against the offending field.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::domain::store::{
    store_timestamp, Collection, Document, DocumentStore, Filter, Sort, SortDirection, StoreError,
    CREATED_AT_FIELD, ID_FIELD, UPDATED_AT_FIELD,
};
use crate::shared::object_id::{ObjectId, ObjectIdGenerator};

const UNIQUE_VIOLATION: &str = "23505";
const UNDEFINED_TABLE: &str = "42P01";

/// PostgreSQL document store
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
    ids: Arc<ObjectIdGenerator>,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            ids: Arc::new(ObjectIdGenerator::new()),
        }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    fn collection(&self, name: &str) -> Arc<dyn Collection> {
        Arc::new(PgCollection {
            pool: self.pool.clone(),
            name: name.to_string(),
            ids: self.ids.clone(),
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database pool closed");
    }
}

/// One collection within the `documents` table.
pub struct PgCollection {
    pool: PgPool,
    name: String,
    ids: Arc<ObjectIdGenerator>,
}

impl PgCollection {
    fn map_error(&self, error: sqlx::Error) -> StoreError {
        if let sqlx::Error::Database(db_error) = &error {
            match db_error.code().as_deref() {
                Some(UNIQUE_VIOLATION) => {
                    let field = db_error
                        .constraint()
                        .and_then(field_from_constraint)
                        .unwrap_or("unknown")
                        .to_string();
                    return StoreError::Duplicate { field };
                }
                Some(UNDEFINED_TABLE) => return StoreError::MissingCollection(self.name.clone()),
                _ => {}
            }
        }
        StoreError::Database(error)
    }

    fn select<'a>(&self, columns: &str, filter: &Filter) -> QueryBuilder<'a, Postgres> {
        let mut builder = QueryBuilder::new(format!("SELECT {} FROM documents WHERE collection = ", columns));
        builder.push_bind(self.name.clone());
        builder.push(" AND ");
        push_filter(&mut builder, filter);
        builder
    }
}

#[async_trait]
impl Collection for PgCollection {
    async fn find_one(&self, filter: &Filter) -> Result<Option<Document>, StoreError> {
        let mut query = self.select("doc", filter);
        query.push(" LIMIT 1");

        let row: Option<Json<Value>> = query
            .build_query_scalar()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| self.map_error(e))?;

        row.map(into_document).transpose()
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Document>, StoreError> {
        let row: Option<Json<Value>> = sqlx::query_scalar(
            r#"
            SELECT doc FROM documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(&self.name)
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| self.map_error(e))?;

        row.map(into_document).transpose()
    }

    async fn find(
        &self,
        filter: &Filter,
        sort: &Sort,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Document>, StoreError> {
        let mut query = self.select("doc", filter);
        push_order(&mut query, sort);
        query.push(" LIMIT ");
        query.push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
        query.push(" OFFSET ");
        query.push_bind(i64::try_from(skip).unwrap_or(i64::MAX));

        let rows: Vec<Json<Value>> = query
            .build_query_scalar()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| self.map_error(e))?;

        rows.into_iter().map(into_document).collect()
    }

    async fn count_documents(&self, filter: &Filter) -> Result<u64, StoreError> {
        let count: i64 = self
            .select("COUNT(*)", filter)
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| self.map_error(e))?;

        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn create(&self, mut doc: Document) -> Result<Document, StoreError> {
        let id = self.ids.generate();
        let now = store_timestamp(Utc::now());
        doc.insert(ID_FIELD.into(), Value::String(id.to_string()));
        doc.insert(CREATED_AT_FIELD.into(), now.clone());
        doc.insert(UPDATED_AT_FIELD.into(), now);

        let row: Json<Value> = sqlx::query_scalar(
            r#"
            INSERT INTO documents (collection, id, doc)
            VALUES ($1, $2, $3)
            RETURNING doc
            "#,
        )
        .bind(&self.name)
        .bind(id.to_string())
        .bind(Json(Value::Object(doc)))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| self.map_error(e))?;

        into_document(row)
    }

    async fn find_by_id_and_update(
        &self,
        id: &ObjectId,
        mut patch: Document,
    ) -> Result<Option<Document>, StoreError> {
        patch.remove(ID_FIELD);
        patch.remove(CREATED_AT_FIELD);
        patch.insert(UPDATED_AT_FIELD.into(), store_timestamp(Utc::now()));

        let row: Option<Json<Value>> = sqlx::query_scalar(
            r#"
            UPDATE documents
            SET doc = doc || $3
            WHERE collection = $1 AND id = $2
            RETURNING doc
            "#,
        )
        .bind(&self.name)
        .bind(id.to_string())
        .bind(Json(Value::Object(patch)))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| self.map_error(e))?;

        row.map(into_document).transpose()
    }

    async fn find_by_id_and_delete(&self, id: &ObjectId) -> Result<Option<Document>, StoreError> {
        let row: Option<Json<Value>> = sqlx::query_scalar(
            r#"
            DELETE FROM documents
            WHERE collection = $1 AND id = $2
            RETURNING doc
            "#,
        )
        .bind(&self.name)
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| self.map_error(e))?;

        row.map(into_document).transpose()
    }
}

/// `blog_posts__slug__key` -> `slug`
fn field_from_constraint(constraint: &str) -> Option<&str> {
    let mut parts = constraint.split("__");
    let _collection = parts.next()?;
    let field = parts.next()?;
    (parts.next() == Some("key")).then_some(field)
}

fn into_document(row: Json<Value>) -> Result<Document, StoreError> {
    match row.0 {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Malformed(format!("expected object, got {}", other))),
    }
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &Filter) {
    match filter {
        Filter::All => {
            builder.push("TRUE");
        }
        Filter::Eq(field, value) => {
            builder.push("COALESCE(doc -> ");
            builder.push_bind(field.clone());
            builder.push(", 'null'::jsonb) = ");
            builder.push_bind(Json(value.clone()));
        }
        Filter::Ne(field, value) => {
            builder.push("COALESCE(doc -> ");
            builder.push_bind(field.clone());
            builder.push(", 'null'::jsonb) <> ");
            builder.push_bind(Json(value.clone()));
        }
        Filter::Contains(field, value) => {
            builder.push("COALESCE(doc -> ");
            builder.push_bind(field.clone());
            builder.push(", '[]'::jsonb) @> ");
            builder.push_bind(Json(Value::Array(vec![value.clone()])));
        }
        Filter::And(filters) => push_group(builder, filters, " AND ", "TRUE"),
        Filter::Or(filters) => push_group(builder, filters, " OR ", "FALSE"),
    }
}

fn push_group(builder: &mut QueryBuilder<'_, Postgres>, filters: &[Filter], joiner: &str, empty: &str) {
    if filters.is_empty() {
        builder.push(empty);
        return;
    }

    builder.push("(");
    for (i, filter) in filters.iter().enumerate() {
        if i > 0 {
            builder.push(joiner);
        }
        push_filter(builder, filter);
    }
    builder.push(")");
}

fn push_order(builder: &mut QueryBuilder<'_, Postgres>, sort: &Sort) {
    // Missing fields sort lowest, as in the in-memory store.
    let (direction, nulls) = match sort.direction {
        SortDirection::Ascending => ("ASC", "NULLS FIRST"),
        SortDirection::Descending => ("DESC", "NULLS LAST"),
    };

    builder.push(" ORDER BY doc -> ");
    builder.push_bind(sort.field.clone());
    builder.push(format!(" {} {}, id {}", direction, nulls, direction));
}
