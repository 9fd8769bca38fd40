//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **CrudService**: add/get/list/update/delete for any `Resource`
//! - **AuthService**: credential checks and session token signing

pub mod auth_service;
pub mod crud_service;

pub use auth_service::{AuthService, AuthServiceImpl, Claims};
pub use crud_service::{CrudService, CrudSettings, Page};
