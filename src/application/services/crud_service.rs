//! Generic CRUD Service
//!
//! One implementation of add / get / list / update / delete, instantiated
//! per [`Resource`]. Every operation follows the same shape:
//!
//! 1. Parse ids and validate input before touching the store
//! 2. Check uniqueness explicitly before any write
//! 3. Perform a single atomic store call for the mutation
//! 4. Map absent records to `NotFound` and anything unexpected (store
//!    failures, timeouts, panics) to `System`

use std::future::Future;
use std::marker::PhantomData;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use serde::Serialize;
use serde_json::Value;

use crate::config::Settings;
use crate::domain::resource::{touches_cross_fields, unique_values, Resource};
use crate::domain::store::{Collection, Document, Filter, Sort, StoreError, ID_FIELD};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;
use crate::shared::object_id::ObjectId;
use crate::shared::validation::parse_object_id;

/// Paging and timeout knobs shared by every resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrudSettings {
    pub default_limit: u64,
    pub max_limit: u64,
    pub query_timeout: Duration,
}

impl CrudSettings {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            default_limit: settings.pagination.default_limit,
            max_limit: settings.pagination.max_limit,
            query_timeout: settings.database.query_timeout(),
        }
    }
}

impl Default for CrudSettings {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
            query_timeout: Duration::from_secs(10),
        }
    }
}

/// One page of a list query.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub total_pages: u64,
    pub limit: u64,
}

impl<T: Serialize> Page<T> {
    /// Response body with the items under `plural`.
    pub fn into_json(self, plural: &str) -> Result<Value, AppError> {
        let items = serde_json::to_value(&self.items)
            .map_err(|e| AppError::system("Page items did not serialize", e.to_string()))?;

        let mut body = serde_json::Map::new();
        body.insert(plural.to_string(), items);
        body.insert("total".into(), self.total.into());
        body.insert("totalPages".into(), self.total_pages.into());
        body.insert("page".into(), self.page.into());
        body.insert("limit".into(), self.limit.into());
        Ok(Value::Object(body))
    }
}

/// CRUD operations for one resource type.
pub struct CrudService<R: Resource> {
    collection: Arc<dyn Collection>,
    settings: CrudSettings,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> CrudService<R> {
    pub fn new(collection: Arc<dyn Collection>, settings: CrudSettings) -> Self {
        Self {
            collection,
            settings,
            _resource: PhantomData,
        }
    }

    /// Validate, check uniqueness and insert.
    pub async fn add(&self, input: R::NewInput) -> Result<R, AppError> {
        self.guarded("add", async move {
            let doc = prepare("prepare_new", move || R::prepare_new(input)).await?;
            self.ensure_unique(&doc, None).await?;

            let created = self.call("create", self.collection.create(doc)).await?;
            let record = decode::<R>(created)?;

            tracing::info!(collection = R::COLLECTION, id = %record.id(), "Record created");
            Ok(record)
        })
        .await
    }

    pub async fn get_by_id(&self, id: &str) -> Result<R, AppError> {
        self.guarded("get_by_id", async move {
            let object_id = parse_object_id(id)?;

            let found = self
                .call("find_by_id", self.collection.find_by_id(&object_id))
                .await?
                .ok_or_else(|| AppError::not_found(R::LABEL, id))?;

            decode::<R>(found)
        })
        .await
    }

    /// Newest first. `page` and `limit` default from settings; `limit` is
    /// capped at the configured maximum.
    pub async fn get_all(
        &self,
        filter: R::ListFilter,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> Result<Page<R>, AppError> {
        self.guarded("get_all", async move {
            let (page, limit) = self.page_window(page, limit)?;
            let filter = R::list_filter(filter);
            let sort = Sort::newest_first();
            let skip = (page - 1).saturating_mul(limit);

            let (docs, total) = tokio::try_join!(
                self.call("find", self.collection.find(&filter, &sort, skip, limit)),
                self.call("count_documents", self.collection.count_documents(&filter)),
            )?;

            let items = docs
                .into_iter()
                .map(decode::<R>)
                .collect::<Result<Vec<_>, _>>()?;
            let total_pages = if total == 0 { 0 } else { total.div_ceil(limit) };

            Ok(Page {
                items,
                total,
                page,
                total_pages,
                limit,
            })
        })
        .await
    }

    /// Apply a partial update. Fields absent from the patch are untouched.
    pub async fn update(&self, id: &str, patch: R::Patch) -> Result<R, AppError> {
        self.guarded("update", async move {
            let object_id = parse_object_id(id)?;
            let changes = prepare("prepare_patch", move || R::prepare_patch(patch)).await?;
            if changes.is_empty() {
                return Err(AppError::invalid_field(
                    "body",
                    "At least one field must be provided",
                ));
            }

            if touches_cross_fields::<R>(&changes) {
                self.check_merged(&object_id, id, &changes).await?;
            }
            self.ensure_unique(&changes, Some(&object_id)).await?;

            let updated = self
                .call(
                    "find_by_id_and_update",
                    self.collection.find_by_id_and_update(&object_id, changes),
                )
                .await?
                .ok_or_else(|| AppError::not_found(R::LABEL, id))?;
            let record = decode::<R>(updated)?;

            tracing::info!(collection = R::COLLECTION, id = %record.id(), "Record updated");
            Ok(record)
        })
        .await
    }

    /// Remove the record and return what was removed.
    pub async fn delete(&self, id: &str) -> Result<R, AppError> {
        self.guarded("delete", async move {
            let object_id = parse_object_id(id)?;

            let removed = self
                .call(
                    "find_by_id_and_delete",
                    self.collection.find_by_id_and_delete(&object_id),
                )
                .await?
                .ok_or_else(|| AppError::not_found(R::LABEL, id))?;
            let record = decode::<R>(removed)?;

            tracing::info!(collection = R::COLLECTION, id = %record.id(), "Record deleted");
            Ok(record)
        })
        .await
    }

    fn page_window(&self, page: Option<u64>, limit: Option<u64>) -> Result<(u64, u64), AppError> {
        let page = page.unwrap_or(1);
        if page == 0 {
            return Err(AppError::invalid_field("page", "Page must be at least 1"));
        }

        let limit = limit.unwrap_or(self.settings.default_limit);
        if limit == 0 {
            return Err(AppError::invalid_field("limit", "Limit must be at least 1"));
        }

        Ok((page, limit.min(self.settings.max_limit)))
    }

    /// Validate the stored record with `changes` applied.
    async fn check_merged(&self, object_id: &ObjectId, id: &str, changes: &Document) -> Result<(), AppError> {
        let mut merged = self
            .call("find_by_id", self.collection.find_by_id(object_id))
            .await?
            .ok_or_else(|| AppError::not_found(R::LABEL, id))?;
        merged.extend(changes.clone());
        R::check_merged(&merged)
    }

    /// Fail with `Duplicity` if another record already holds any of the
    /// unique values in `doc`.
    async fn ensure_unique(&self, doc: &Document, exclude: Option<&ObjectId>) -> Result<(), AppError> {
        let values = unique_values::<R>(doc);
        if values.is_empty() {
            return Ok(());
        }

        let candidates = Filter::or(
            values
                .iter()
                .map(|(field, value)| Filter::Eq(field.to_string(), value.clone()))
                .collect(),
        );
        let filter = match exclude {
            Some(id) => Filter::and(vec![candidates, Filter::ne(ID_FIELD, id.to_string())]),
            None => candidates,
        };

        let Some(existing) = self.call("find_one", self.collection.find_one(&filter)).await? else {
            return Ok(());
        };

        let conflicts: Vec<String> = values
            .iter()
            .filter(|(field, value)| existing.get(*field) == Some(value))
            .map(|(field, _)| field.to_string())
            .collect();

        tracing::debug!(collection = R::COLLECTION, fields = ?conflicts, "Uniqueness check failed");
        Err(AppError::duplicity(R::LABEL, conflicts))
    }

    /// Run one store call under the query timeout, recording its latency.
    async fn call<T, F>(&self, operation: &'static str, call: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        let started = Instant::now();
        let outcome = tokio::time::timeout(self.settings.query_timeout, call).await;
        metrics::record_store_operation(operation, R::COLLECTION, started.elapsed().as_secs_f64());

        match outcome {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(StoreError::Duplicate { field })) => Err(AppError::duplicity(R::LABEL, vec![field])),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(StoreError::Timeout(self.settings.query_timeout).into()),
        }
    }

    /// Turn a panic anywhere in the operation into a `System` error.
    async fn guarded<T, F>(&self, operation: &str, body: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        match AssertUnwindSafe(body).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => {
                let error = AppError::from_panic(&format!("{}.{}", R::COLLECTION, operation), payload);
                tracing::error!(console = %error.console_message(), "Operation panicked");
                Err(error)
            }
        }
    }
}

/// Run input preparation on the blocking pool; admin inputs hash passwords.
async fn prepare<F>(operation: &str, f: F) -> Result<Document, AppError>
where
    F: FnOnce() -> Result<Document, AppError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::from_join(operation, e))?
}

fn decode<R: Resource>(doc: Document) -> Result<R, AppError> {
    serde_json::from_value(Value::Object(doc)).map_err(|e| {
        AppError::system(format!("Stored {} could not be decoded", R::LABEL), e.to_string())
    })
}
