//! Response DTOs
//!
//! Data structures for API response bodies.

use serde::Serialize;

use crate::domain::Admin;

/// Login response; the token itself travels only in the session cookie
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub admin: Admin,
    /// Seconds until the session expires
    pub expires_in: i64,
}
