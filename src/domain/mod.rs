//! # Domain Layer
//!
//! Entities and the storage contract they are persisted through.
//!
//! ## Structure
//!
//! - **entities**: Admin and the five portfolio content types
//! - **resource**: binds an entity to its collection and validators
//! - **store**: document store traits, filters and sorting
//!
//! Nothing here depends on the infrastructure or presentation layers.

pub mod entities;
pub mod resource;
pub mod store;

pub use entities::*;
pub use resource::Resource;
pub use store::{Collection, Document, DocumentStore, Filter, Sort, StoreError};
