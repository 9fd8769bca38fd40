//! Admin entity.
//!
//! Stored in the `admins` collection. Username and email are each unique.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::domain::resource::{NoFilter, Resource};
use crate::domain::store::Document;
use crate::shared::error::AppError;
use crate::shared::object_id::ObjectId;
use crate::shared::password::hash_password;
use crate::shared::validation::{trimmed, trimmed_opt, validate};

/// Represents an administrator account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    /// Login name (3-32 characters, unique)
    pub username: String,

    /// Email address, lowercased (unique)
    pub email: String,

    /// Argon2 password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registration input
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewAdmin {
    #[validate(length(min = 3, max = 32, message = "Username must be 3-32 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,
}

/// Profile edit
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct AdminPatch {
    #[validate(length(min = 3, max = 32, message = "Username must be 3-32 characters"))]
    pub username: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: Option<String>,
}

fn normalize_email(email: String) -> String {
    trimmed(email).to_lowercase()
}

impl Resource for Admin {
    type NewInput = NewAdmin;
    type Patch = AdminPatch;
    type ListFilter = NoFilter;

    const COLLECTION: &'static str = "admins";
    const LABEL: &'static str = "Admin";
    const PLURAL: &'static str = "admins";
    const UNIQUE_FIELDS: &'static [&'static str] = &["username", "email"];

    fn id(&self) -> &ObjectId {
        &self.id
    }

    fn prepare_new(input: NewAdmin) -> Result<Document, AppError> {
        let input = NewAdmin {
            username: trimmed(input.username),
            email: normalize_email(input.email),
            password: input.password,
        };
        validate(&input)?;

        let mut doc = Document::new();
        doc.insert("username".into(), Value::String(input.username));
        doc.insert("email".into(), Value::String(input.email));
        doc.insert("passwordHash".into(), Value::String(hash_password(&input.password)?));
        Ok(doc)
    }

    fn prepare_patch(patch: AdminPatch) -> Result<Document, AppError> {
        let patch = AdminPatch {
            username: trimmed_opt(patch.username),
            email: trimmed_opt(patch.email).map(normalize_email),
            password: patch.password,
        };
        validate(&patch)?;

        let mut doc = Document::new();
        if let Some(username) = patch.username {
            doc.insert("username".into(), Value::String(username));
        }
        if let Some(email) = patch.email {
            doc.insert("email".into(), Value::String(email));
        }
        if let Some(password) = patch.password {
            doc.insert("passwordHash".into(), Value::String(hash_password(&password)?));
        }
        Ok(doc)
    }
}
