//! CORS Middleware Configuration
//!
//! The session travels in a cookie, so cross-origin requests need
//! credentials; that rules out wildcard origins, methods and headers.

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::CorsLayer;

use crate::config::CorsSettings;

/// Create CORS layer from settings
pub fn create_cors_layer(settings: &CorsSettings) -> CorsLayer {
    let origins: Vec<HeaderValue> = settings
        .allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    if origins.is_empty() {
        tracing::warn!("No valid CORS origins configured; cross-origin requests will be refused");
        return CorsLayer::new();
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}
