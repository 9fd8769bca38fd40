//! Data Transfer Objects
//!
//! DTOs for API request/response serialization. Entity inputs and patches
//! live with their entities; these cover the auth and paging surface.

pub mod request;
pub mod response;

pub use request::{LoginRequest, PageQuery};
pub use response::LoginResponse;
