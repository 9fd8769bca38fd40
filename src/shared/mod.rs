//! Shared Utilities
//!
//! Common utilities used across all layers.

pub mod error;
pub mod object_id;
pub mod password;
pub mod validation;

pub use error::{AppError, ErrorKind, FieldError};
pub use object_id::{ObjectId, ObjectIdGenerator};
