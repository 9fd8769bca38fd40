//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use axum::{
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Router,
};

use super::handlers;
use crate::domain::{Admin, BlogPost, Education, Experience, Project, Resource, Skill};
use crate::infrastructure::metrics;
use crate::presentation::middleware::{auth_middleware, track_metrics};
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_routes(state.clone()))
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))
        .route_layer(middleware::from_fn(track_metrics))
        .fallback(handlers::not_found)
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    let metrics = metrics::gather_metrics();
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics,
    )
}

/// API routes
fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes(state.clone()))
        .merge(content_routes(state))
}

/// Authentication routes (public except `/me`)
fn auth_routes(state: AppState) -> Router<AppState> {
    let router = Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        .route(
            "/me",
            get(handlers::auth::me)
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        );

    if state.settings.auth.allow_registration {
        router.route("/register", post(handlers::auth::register))
    } else {
        router
    }
}

/// Entity routes (protected)
fn content_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(resource_routes::<Admin>("/admins"))
        .merge(resource_routes::<BlogPost>("/blog-posts"))
        .merge(resource_routes::<Project>("/projects"))
        .merge(resource_routes::<Skill>("/skills"))
        .merge(resource_routes::<Education>("/education"))
        .merge(resource_routes::<Experience>("/experience"))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// List/create on `path`, read/update/delete on `path/{id}`
fn resource_routes<R: Resource>(path: &str) -> Router<AppState> {
    use handlers::resource::{create, destroy, list, show, update};

    Router::new()
        .route(path, get(list::<R>).post(create::<R>))
        .route(
            &format!("{}/{{id}}", path),
            get(show::<R>).patch(update::<R>).delete(destroy::<R>),
        )
}
