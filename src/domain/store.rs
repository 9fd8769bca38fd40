//! Document store contract.
//!
//! The minimal persistence capability the logic layer consumes. Documents
//! are JSON objects; the store owns `_id`, `createdAt` and `updatedAt`.
//! Implementations live in the infrastructure layer.

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use crate::shared::error::AppError;
use crate::shared::object_id::ObjectId;

/// A stored document.
pub type Document = serde_json::Map<String, Value>;

pub const ID_FIELD: &str = "_id";
pub const CREATED_AT_FIELD: &str = "createdAt";
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// Timestamp representation used inside documents.
///
/// Fixed-width UTC with millisecond precision, so lexical order is
/// chronological order.
pub fn store_timestamp(at: DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Query filter over document fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every document.
    All,
    /// Field equals value; a missing field equals `null`.
    Eq(String, Value),
    /// Field differs from value.
    Ne(String, Value),
    /// Array field contains value.
    Contains(String, Value),
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq(field.into(), value.into())
    }

    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Ne(field.into(), value.into())
    }

    pub fn contains(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Contains(field.into(), value.into())
    }

    /// Conjunction, flattening `All` away.
    pub fn and(filters: Vec<Filter>) -> Self {
        let mut filters: Vec<Filter> = filters.into_iter().filter(|f| *f != Filter::All).collect();
        match filters.len() {
            0 => Self::All,
            1 => filters.remove(0),
            _ => Self::And(filters),
        }
    }

    pub fn or(filters: Vec<Filter>) -> Self {
        Self::Or(filters)
    }

    /// Evaluate the filter against a document.
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Self::All => true,
            Self::Eq(field, value) => doc.get(field).unwrap_or(&Value::Null) == value,
            Self::Ne(field, value) => doc.get(field).unwrap_or(&Value::Null) != value,
            Self::Contains(field, value) => doc
                .get(field)
                .and_then(Value::as_array)
                .is_some_and(|items| items.contains(value)),
            Self::And(filters) => filters.iter().all(|f| f.matches(doc)),
            Self::Or(filters) => filters.iter().any(|f| f.matches(doc)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Sort order for `find`. Ties are broken by `_id` in the same direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }

    /// Newest first.
    pub fn newest_first() -> Self {
        Self::desc(CREATED_AT_FIELD)
    }

    /// Compare two documents under this sort order.
    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        let ordering = compare_values(a.get(&self.field), b.get(&self.field))
            .then_with(|| compare_values(a.get(ID_FIELD), b.get(ID_FIELD)));

        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Total order over JSON scalars: missing/null < bool < number < string < other.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(value: Option<&Value>) -> u8 {
        match value {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(_) => 4,
        }
    }

    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Store failures
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A storage-level uniqueness constraint rejected the write.
    #[error("duplicate value for unique field `{field}`")]
    Duplicate { field: String },

    /// The addressed collection does not exist.
    #[error("collection not found: {0}")]
    MissingCollection(String),

    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("malformed document: {0}")]
    Malformed(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Duplicate { field } => AppError::duplicity("Record", vec![field]),
            other => AppError::system("Store operation failed", other.to_string()),
        }
    }
}

/// One collection of documents.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Collection: Send + Sync {
    /// First document matching `filter`.
    async fn find_one(&self, filter: &Filter) -> Result<Option<Document>, StoreError>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Document>, StoreError>;

    /// Matching documents in `sort` order, after skipping `skip`, at most `limit`.
    async fn find(
        &self,
        filter: &Filter,
        sort: &Sort,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Document>, StoreError>;

    async fn count_documents(&self, filter: &Filter) -> Result<u64, StoreError>;

    /// Insert a document; the store assigns `_id` and timestamps.
    async fn create(&self, doc: Document) -> Result<Document, StoreError>;

    /// Merge `patch` into the document atomically and return the updated document.
    async fn find_by_id_and_update(
        &self,
        id: &ObjectId,
        patch: Document,
    ) -> Result<Option<Document>, StoreError>;

    /// Remove the document atomically and return it.
    async fn find_by_id_and_delete(&self, id: &ObjectId) -> Result<Option<Document>, StoreError>;
}

/// Process-wide store handle, opened at startup and closed at shutdown.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    fn collection(&self, name: &str) -> Arc<dyn Collection>;

    /// Round-trip to the backing store.
    async fn ping(&self) -> Result<(), StoreError>;

    async fn close(&self);
}
