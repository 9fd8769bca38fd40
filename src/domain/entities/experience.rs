//! Work experience entity.
//!
//! An entry is either `current` or has an `endDate`, never both.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::resource::{date_field, insert_slug, to_document, Resource};
use crate::domain::store::{Document, Filter};
use crate::shared::error::AppError;
use crate::shared::object_id::ObjectId;
use crate::shared::validation::{check_date_range, normalize_list, trimmed, trimmed_opt, validate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub slug: String,
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub current: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewExperience {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 200, message = "Company must be 1-200 characters"))]
    pub company: String,

    #[validate(length(max = 200, message = "Location must be at most 200 characters"))]
    pub location: Option<String>,

    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,

    #[serde(default)]
    pub current: bool,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    #[serde(default)]
    #[validate(length(max = 30, message = "At most 30 technologies are allowed"))]
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExperiencePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200, message = "Company must be 1-200 characters"))]
    pub company: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 200, message = "Location must be at most 200 characters"))]
    pub location: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 30, message = "At most 30 technologies are allowed"))]
    pub technologies: Option<Vec<String>>,
}

/// `?current=true`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExperienceFilter {
    pub current: Option<bool>,
}

fn check_current(current: bool, end_date: Option<NaiveDate>) -> Result<(), AppError> {
    if current && end_date.is_some() {
        return Err(AppError::invalid_field(
            "endDate",
            "A current position cannot have an end date",
        ));
    }
    Ok(())
}

impl Resource for Experience {
    type NewInput = NewExperience;
    type Patch = ExperiencePatch;
    type ListFilter = ExperienceFilter;

    const COLLECTION: &'static str = "experience";
    const LABEL: &'static str = "Experience";
    const PLURAL: &'static str = "experience";
    const UNIQUE_FIELDS: &'static [&'static str] = &["title", "slug"];
    const CROSS_FIELDS: &'static [&'static str] = &["startDate", "endDate", "current"];

    fn id(&self) -> &ObjectId {
        &self.id
    }

    fn prepare_new(input: NewExperience) -> Result<Document, AppError> {
        let input = NewExperience {
            title: trimmed(input.title),
            company: trimmed(input.company),
            location: trimmed_opt(input.location),
            description: trimmed_opt(input.description),
            technologies: normalize_list(input.technologies),
            ..input
        };
        validate(&input)?;
        check_date_range(Some(input.start_date), input.end_date)?;
        check_current(input.current, input.end_date)?;

        let mut doc = to_document(&input)?;
        insert_slug(&mut doc, "title")?;
        Ok(doc)
    }

    fn prepare_patch(patch: ExperiencePatch) -> Result<Document, AppError> {
        let patch = ExperiencePatch {
            title: patch.title.map(trimmed),
            company: patch.company.map(trimmed),
            location: trimmed_opt(patch.location),
            description: trimmed_opt(patch.description),
            technologies: patch.technologies.map(normalize_list),
            ..patch
        };
        validate(&patch)?;
        check_date_range(patch.start_date, patch.end_date)?;
        check_current(patch.current.unwrap_or(false), patch.end_date)?;

        let mut doc = to_document(&patch)?;
        insert_slug(&mut doc, "title")?;
        // Becoming current clears a previously stored end date.
        if patch.current == Some(true) {
            doc.insert("endDate".into(), serde_json::Value::Null);
        }
        Ok(doc)
    }

    fn list_filter(filter: ExperienceFilter) -> Filter {
        match filter.current {
            Some(current) => Filter::eq("current", current),
            None => Filter::All,
        }
    }

    fn check_merged(merged: &Document) -> Result<(), AppError> {
        let end_date = date_field(merged, "endDate");
        check_date_range(date_field(merged, "startDate"), end_date)?;
        let current = merged
            .get("current")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);
        check_current(current, end_date)
    }
}
