//! Project entity.

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
pub struct Project {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub slug: String,
    pub description: String,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub repo_url: Option<String>,
    #[serde(default)]
    pub live_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 5000, message = "Description must be 1-5000 characters"))]
    pub description: String,

    #[serde(default)]
    #[validate(length(max = 30, message = "At most 30 technologies are allowed"))]
    pub technologies: Vec<String>,

    #[validate(url(message = "Repository URL must be a valid URL"))]
    pub repo_url: Option<String>,

    #[validate(url(message = "Live URL must be a valid URL"))]
    pub live_url: Option<String>,

    #[validate(url(message = "Image URL must be a valid URL"))]
    pub image_url: Option<String>,

    #[serde(default)]
    pub featured: bool,

    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 5000, message = "Description must be 1-5000 characters"))]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 30, message = "At most 30 technologies are allowed"))]
    pub technologies: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "Repository URL must be a valid URL"))]
    pub repo_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "Live URL must be a valid URL"))]
    pub live_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "Image URL must be a valid URL"))]
    pub image_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

/// `?featured=true`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectFilter {
    pub featured: Option<bool>,
}

impl Resource for Project {
    type NewInput = NewProject;
    type Patch = ProjectPatch;
    type ListFilter = ProjectFilter;

    const COLLECTION: &'static str = "projects";
    const LABEL: &'static str = "Project";
    const PLURAL: &'static str = "projects";
    const UNIQUE_FIELDS: &'static [&'static str] = &["title", "slug"];
    const CROSS_FIELDS: &'static [&'static str] = &["startDate", "endDate"];

    fn id(&self) -> &ObjectId {
        &self.id
    }

    fn prepare_new(input: NewProject) -> Result<Document, AppError> {
        let input = NewProject {
            title: trimmed(input.title),
            description: trimmed(input.description),
            technologies: normalize_list(input.technologies),
            repo_url: trimmed_opt(input.repo_url),
            live_url: trimmed_opt(input.live_url),
            image_url: trimmed_opt(input.image_url),
            ..input
        };
        validate(&input)?;
        check_date_range(input.start_date, input.end_date)?;

        let mut doc = to_document(&input)?;
        insert_slug(&mut doc, "title")?;
        Ok(doc)
    }

    fn prepare_patch(patch: ProjectPatch) -> Result<Document, AppError> {
        let patch = ProjectPatch {
            title: patch.title.map(trimmed),
            description: patch.description.map(trimmed),
            technologies: patch.technologies.map(normalize_list),
            repo_url: trimmed_opt(patch.repo_url),
            live_url: trimmed_opt(patch.live_url),
            image_url: trimmed_opt(patch.image_url),
            ..patch
        };
        validate(&patch)?;
        check_date_range(patch.start_date, patch.end_date)?;

        let mut doc = to_document(&patch)?;
        insert_slug(&mut doc, "title")?;
        Ok(doc)
    }

    fn list_filter(filter: ProjectFilter) -> Filter {
        match filter.featured {
            Some(featured) => Filter::eq("featured", featured),
            None => Filter::All,
        }
    }

    fn check_merged(merged: &Document) -> Result<(), AppError> {
        check_date_range(date_field(merged, "startDate"), date_field(merged, "endDate"))
    }
}
