//! HTTP Handlers
//!
//! Request handlers for all HTTP endpoints.

pub mod auth;
pub mod health;
pub mod resource;

use axum::http::Uri;

use crate::shared::error::AppError;

/// Fallback for unknown routes
pub async fn not_found(uri: Uri) -> AppError {
    AppError::not_found("Route", uri.path())
}
