//! Common Test Utilities
//!
//! Shared helpers, fixtures, and test infrastructure. Every `TestApp`
//! runs the real router over its own in-memory store.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use fake::faker::internet::en::{SafeEmail, Username};
use fake::Fake;
use serde_json::Value;
use tower::ServiceExt;

use portfolio_admin::config::Settings;
use portfolio_admin::domain::{Admin, NewAdmin};
use portfolio_admin::infrastructure::repositories::InMemoryDocumentStore;
use portfolio_admin::presentation::http::routes::create_router;
use portfolio_admin::startup::AppState;

pub const TEST_PASSWORD: &str = "TestPassword123!";

/// Test application
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Application with registration disabled
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    /// Application with `POST /api/auth/register` mounted
    pub fn with_registration() -> Self {
        let mut settings = Settings::default();
        settings.auth.allow_registration = true;
        Self::with_settings(settings)
    }

    pub fn with_settings(settings: Settings) -> Self {
        let state = AppState::new(Arc::new(InMemoryDocumentStore::new()), settings);
        Self {
            router: create_router(state.clone()),
            state,
        }
    }

    /// Send a request, optionally with a JSON body and a session cookie
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        cookie: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        self.request(Method::GET, uri, None, cookie).await
    }

    pub async fn post_json(&self, uri: &str, body: Value, cookie: Option<&str>) -> Response {
        self.request(Method::POST, uri, Some(body), cookie).await
    }

    pub async fn patch_json(&self, uri: &str, body: Value, cookie: &str) -> Response {
        self.request(Method::PATCH, uri, Some(body), Some(cookie)).await
    }

    pub async fn delete(&self, uri: &str, cookie: &str) -> Response {
        self.request(Method::DELETE, uri, None, Some(cookie)).await
    }

    /// Insert an admin directly through the CRUD service
    pub async fn seed_admin(&self) -> TestAdmin {
        let username = unique_username();
        let email: String = SafeEmail().fake();
        let admin = self
            .state
            .crud::<Admin>()
            .add(NewAdmin {
                username: username.clone(),
                email,
                password: TEST_PASSWORD.into(),
            })
            .await
            .unwrap();

        TestAdmin { admin, username }
    }

    /// Log in and return the `Cookie` header value for the session
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .post_json(
                "/api/auth/login",
                serde_json::json!({ "username": username, "password": password }),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        session_cookie(&response).expect("login sets a session cookie")
    }

    /// Seed an admin and log in as them
    pub async fn logged_in(&self) -> (TestAdmin, String) {
        let admin = self.seed_admin().await;
        let cookie = self.login(&admin.username, TEST_PASSWORD).await;
        (admin, cookie)
    }
}

/// A seeded admin and the username used to create it
pub struct TestAdmin {
    pub admin: Admin,
    pub username: String,
}

/// `name=value` of the first `Set-Cookie` header
pub fn session_cookie(response: &Response) -> Option<String> {
    let raw = response.headers().get(header::SET_COOKIE)?.to_str().ok()?;
    raw.split(';').next().map(|pair| pair.trim().to_string())
}

/// The full `Set-Cookie` header, attributes included
pub fn set_cookie_header(response: &Response) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Username that fits the 3-32 character rule
pub fn unique_username() -> String {
    let base: String = Username().fake();
    let base: String = base.chars().take(20).collect();
    format!("{}_{}", base, rand::random::<u16>())
}
