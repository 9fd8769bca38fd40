//! REST API endpoint tests

mod auth_tests;
mod crud_tests;
mod health_tests;
