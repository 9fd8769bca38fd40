//! Blog post entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::resource::{insert_slug, to_document, Resource};
use crate::domain::store::{Document, Filter};
use crate::shared::error::AppError;
use crate::shared::object_id::ObjectId;
use crate::shared::validation::{normalize_list, trimmed, trimmed_opt, validate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub slug: String,
    pub content: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewBlogPost {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,

    #[validate(length(max = 500, message = "Excerpt must be at most 500 characters"))]
    pub excerpt: Option<String>,

    #[serde(default)]
    #[validate(length(max = 20, message = "At most 20 tags are allowed"))]
    pub tags: Vec<String>,

    #[validate(url(message = "Cover image must be a valid URL"))]
    pub cover_image: Option<String>,

    #[serde(default)]
    pub published: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500, message = "Excerpt must be at most 500 characters"))]
    pub excerpt: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 20, message = "At most 20 tags are allowed"))]
    pub tags: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "Cover image must be a valid URL"))]
    pub cover_image: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
}

/// `?published=true&tag=rust`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlogPostFilter {
    pub published: Option<bool>,
    pub tag: Option<String>,
}

impl Resource for BlogPost {
    type NewInput = NewBlogPost;
    type Patch = BlogPostPatch;
    type ListFilter = BlogPostFilter;

    const COLLECTION: &'static str = "blog_posts";
    const LABEL: &'static str = "Blog post";
    const PLURAL: &'static str = "blogPosts";
    const UNIQUE_FIELDS: &'static [&'static str] = &["title", "slug"];

    fn id(&self) -> &ObjectId {
        &self.id
    }

    fn prepare_new(input: NewBlogPost) -> Result<Document, AppError> {
        let input = NewBlogPost {
            title: trimmed(input.title),
            content: trimmed(input.content),
            excerpt: trimmed_opt(input.excerpt),
            tags: normalize_list(input.tags),
            cover_image: trimmed_opt(input.cover_image),
            published: input.published,
        };
        validate(&input)?;

        let mut doc = to_document(&input)?;
        insert_slug(&mut doc, "title")?;
        Ok(doc)
    }

    fn prepare_patch(patch: BlogPostPatch) -> Result<Document, AppError> {
        let patch = BlogPostPatch {
            title: patch.title.map(trimmed),
            content: patch.content.map(trimmed),
            excerpt: trimmed_opt(patch.excerpt),
            tags: patch.tags.map(normalize_list),
            cover_image: trimmed_opt(patch.cover_image),
            published: patch.published,
        };
        validate(&patch)?;

        let mut doc = to_document(&patch)?;
        insert_slug(&mut doc, "title")?;
        Ok(doc)
    }

    fn list_filter(filter: BlogPostFilter) -> Filter {
        let mut filters = Vec::new();
        if let Some(published) = filter.published {
            filters.push(Filter::eq("published", published));
        }
        if let Some(tag) = trimmed_opt(filter.tag) {
            filters.push(Filter::contains("tags", tag));
        }
        Filter::and(filters)
    }
}
