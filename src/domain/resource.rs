//! Resource binding for the generic CRUD template.
//!
//! A resource ties an entity record type to its collection, its validators
//! and its uniqueness fields. The CRUD service is written once against this
//! trait and instantiated per entity.

use std::fmt::Debug;

use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::store::{Document, Filter};
use crate::shared::error::AppError;
use crate::shared::object_id::ObjectId;
use crate::shared::validation::slugify;

pub trait Resource: Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static {
    /// Raw creation input, as parsed from a request body.
    type NewInput: DeserializeOwned + Send + 'static;

    /// Raw partial update, as parsed from a request body.
    type Patch: DeserializeOwned + Send + 'static;

    /// Equality filters accepted by list queries.
    type ListFilter: DeserializeOwned + Default + Send + 'static;

    /// Collection the records are stored in.
    const COLLECTION: &'static str;

    /// Human-readable singular name used in messages.
    const LABEL: &'static str;

    /// Key under which list responses carry their items.
    const PLURAL: &'static str;

    /// Fields whose values must be unique within the collection.
    const UNIQUE_FIELDS: &'static [&'static str];

    fn id(&self) -> &ObjectId;

    /// Validate and normalize creation input into the document to store.
    fn prepare_new(input: Self::NewInput) -> Result<Document, AppError>;

    /// Validate and normalize a patch into the fields to change.
    fn prepare_patch(patch: Self::Patch) -> Result<Document, AppError>;

    /// Fields tied together by rules that span the whole record.
    ///
    /// A patch touching any of these is checked against the stored record
    /// with the patch applied, via [`Resource::check_merged`].
    const CROSS_FIELDS: &'static [&'static str] = &[];

    fn list_filter(_filter: Self::ListFilter) -> Filter {
        Filter::All
    }

    /// Validate a stored record with a patch merged over it.
    fn check_merged(_merged: &Document) -> Result<(), AppError> {
        Ok(())
    }
}

/// List filter for resources that accept none.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct NoFilter {}

/// Serialize a validated value into a document.
pub fn to_document<T: Serialize>(value: &T) -> Result<Document, AppError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(AppError::system(
            "Validated input did not serialize to a document",
            format!("got {}", other),
        )),
        Err(e) => Err(AppError::system("Validated input did not serialize", e.to_string())),
    }
}

/// Derive `slug` from the string in `source`, if present.
pub fn insert_slug(doc: &mut Document, source: &str) -> Result<(), AppError> {
    let Some(text) = doc.get(source).and_then(Value::as_str) else {
        return Ok(());
    };

    let slug = slugify(text);
    if slug.is_empty() {
        return Err(AppError::invalid_field(
            source,
            "Must contain at least one letter or digit",
        ));
    }

    doc.insert("slug".into(), Value::String(slug));
    Ok(())
}

/// Calendar date stored under `field`; absent, null or unparsable is `None`.
pub fn date_field(doc: &Document, field: &str) -> Option<NaiveDate> {
    doc.get(field)?.as_str()?.parse().ok()
}

/// Whether `changes` touches a cross-field rule of `R`.
pub fn touches_cross_fields<R: Resource>(changes: &Document) -> bool {
    R::CROSS_FIELDS.iter().any(|field| changes.contains_key(*field))
}

/// The uniqueness-constrained fields present in `doc`, with their values.
pub fn unique_values<R: Resource>(doc: &Document) -> Vec<(&'static str, Value)> {
    R::UNIQUE_FIELDS
        .iter()
        .filter_map(|field| doc.get(*field).map(|value| (*field, value.clone())))
        .collect()
}
