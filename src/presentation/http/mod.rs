//! HTTP Interface
//!
//! Routes, handlers and the session cookie.

pub mod handlers;
pub mod routes;
pub mod session;

pub use session::SessionCookie;
