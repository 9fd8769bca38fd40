//! Education entity.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::resource::{date_field, insert_slug, to_document, NoFilter, Resource};
use crate::domain::store::Document;
use crate::shared::error::AppError;
use crate::shared::object_id::ObjectId;
use crate::shared::validation::{check_date_range, trimmed, trimmed_opt, validate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub slug: String,
    pub institution: String,
    #[serde(default)]
    pub field_of_study: Option<String>,
    pub start_date: NaiveDate,
    /// `None` while still enrolled
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewEducation {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 200, message = "Institution must be 1-200 characters"))]
    pub institution: String,

    #[validate(length(max = 200, message = "Field of study must be at most 200 characters"))]
    pub field_of_study: Option<String>,

    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EducationPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200, message = "Institution must be 1-200 characters"))]
    pub institution: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 200, message = "Field of study must be at most 200 characters"))]
    pub field_of_study: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,
}

impl Resource for Education {
    type NewInput = NewEducation;
    type Patch = EducationPatch;
    type ListFilter = NoFilter;

    const COLLECTION: &'static str = "education";
    const LABEL: &'static str = "Education";
    const PLURAL: &'static str = "education";
    const UNIQUE_FIELDS: &'static [&'static str] = &["title", "slug"];
    const CROSS_FIELDS: &'static [&'static str] = &["startDate", "endDate"];

    fn id(&self) -> &ObjectId {
        &self.id
    }

    fn prepare_new(input: NewEducation) -> Result<Document, AppError> {
        let input = NewEducation {
            title: trimmed(input.title),
            institution: trimmed(input.institution),
            field_of_study: trimmed_opt(input.field_of_study),
            description: trimmed_opt(input.description),
            ..input
        };
        validate(&input)?;
        check_date_range(Some(input.start_date), input.end_date)?;

        let mut doc = to_document(&input)?;
        insert_slug(&mut doc, "title")?;
        Ok(doc)
    }

    fn prepare_patch(patch: EducationPatch) -> Result<Document, AppError> {
        let patch = EducationPatch {
            title: patch.title.map(trimmed),
            institution: patch.institution.map(trimmed),
            field_of_study: trimmed_opt(patch.field_of_study),
            description: trimmed_opt(patch.description),
            ..patch
        };
        validate(&patch)?;
        check_date_range(patch.start_date, patch.end_date)?;

        let mut doc = to_document(&patch)?;
        insert_slug(&mut doc, "title")?;
        Ok(doc)
    }

    fn check_merged(merged: &Document) -> Result<(), AppError> {
        check_date_range(date_field(merged, "startDate"), date_field(merged, "endDate"))
    }
}
