//! Skill entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::resource::{insert_slug, to_document, Resource};
use crate::domain::store::{Document, Filter};
use crate::shared::error::AppError;
use crate::shared::object_id::ObjectId;
use crate::shared::validation::{trimmed, trimmed_opt, validate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub slug: String,
    pub category: String,
    /// Proficiency, 0-100
    #[serde(default)]
    pub level: Option<u8>,
    #[serde(default)]
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewSkill {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 50, message = "Category must be 1-50 characters"))]
    pub category: String,

    #[validate(range(max = 100, message = "Level must be between 0 and 100"))]
    pub level: Option<u8>,

    #[validate(length(max = 200, message = "Icon must be at most 200 characters"))]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SkillPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 50, message = "Category must be 1-50 characters"))]
    pub category: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(max = 100, message = "Level must be between 0 and 100"))]
    pub level: Option<u8>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 200, message = "Icon must be at most 200 characters"))]
    pub icon: Option<String>,
}

/// `?category=backend`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SkillFilter {
    pub category: Option<String>,
}

impl Resource for Skill {
    type NewInput = NewSkill;
    type Patch = SkillPatch;
    type ListFilter = SkillFilter;

    const COLLECTION: &'static str = "skills";
    const LABEL: &'static str = "Skill";
    const PLURAL: &'static str = "skills";
    const UNIQUE_FIELDS: &'static [&'static str] = &["name", "slug"];

    fn id(&self) -> &ObjectId {
        &self.id
    }

    fn prepare_new(input: NewSkill) -> Result<Document, AppError> {
        let input = NewSkill {
            name: trimmed(input.name),
            category: trimmed(input.category),
            level: input.level,
            icon: trimmed_opt(input.icon),
        };
        validate(&input)?;

        let mut doc = to_document(&input)?;
        insert_slug(&mut doc, "name")?;
        Ok(doc)
    }

    fn prepare_patch(patch: SkillPatch) -> Result<Document, AppError> {
        let patch = SkillPatch {
            name: patch.name.map(trimmed),
            category: patch.category.map(trimmed),
            level: patch.level,
            icon: trimmed_opt(patch.icon),
        };
        validate(&patch)?;

        let mut doc = to_document(&patch)?;
        insert_slug(&mut doc, "name")?;
        Ok(doc)
    }

    fn list_filter(filter: SkillFilter) -> Filter {
        match trimmed_opt(filter.category) {
            Some(category) => Filter::eq("category", category),
            None => Filter::All,
        }
    }
}
