//! Authentication API Tests

use axum::http::StatusCode;
use fake::faker::internet::en::SafeEmail;
use fake::Fake;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{body_json, session_cookie, set_cookie_header, unique_username, TestApp, TEST_PASSWORD};

#[tokio::test]
async fn test_login_sets_http_only_cookie_and_returns_admin() {
    let app = TestApp::new();
    let seeded = app.seed_admin().await;

    let response = app
        .post_json(
            "/api/auth/login",
            json!({ "username": seeded.username, "password": TEST_PASSWORD }),
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let header = set_cookie_header(&response);
    assert!(header.starts_with("accessToken="));
    assert!(header.contains("HttpOnly"));
    assert!(header.contains("SameSite=Lax"));

    let body = body_json(response).await;
    assert_eq!(body["admin"]["_id"], seeded.admin.id.to_string());
    assert_eq!(body["admin"]["username"], seeded.username);
    assert!(body["admin"].get("passwordHash").is_none());
    assert!(body["expiresIn"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn test_login_with_wrong_password_is_rejected() {
    let app = TestApp::new();
    let seeded = app.seed_admin().await;

    let response = app
        .post_json(
            "/api/auth/login",
            json!({ "username": seeded.username, "password": "not-the-password" }),
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(session_cookie(&response).is_none());
    assert_eq!(body_json(response).await["type"], "CREDENTIALS");
}

#[tokio::test]
async fn test_login_with_unknown_username_is_not_found() {
    let app = TestApp::new();

    let response = app
        .post_json(
            "/api/auth/login",
            json!({ "username": "nobody", "password": TEST_PASSWORD }),
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["type"], "NOT_FOUND");
}

#[tokio::test]
async fn test_login_with_missing_fields_is_a_validation_error() {
    let app = TestApp::new();

    let response = app
        .post_json("/api/auth/login", json!({ "username": "" , "password": "" }), None)
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["type"], "VALIDATION");
}

#[tokio::test]
async fn test_me_returns_session_admin() {
    let app = TestApp::new();
    let (seeded, cookie) = app.logged_in().await;

    let response = app.get("/api/auth/me", Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["_id"], seeded.admin.id.to_string());
    assert_eq!(body["email"], seeded.admin.email);
}

#[tokio::test]
async fn test_me_without_cookie_is_unauthorized() {
    let app = TestApp::new();

    let response = app.get("/api/auth/me", None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["type"], "AUTHORIZATION");
}

#[tokio::test]
async fn test_me_with_forged_cookie_is_unauthorized() {
    let app = TestApp::new();

    let response = app.get("/api/auth/me", Some("accessToken=not.a.jwt")).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_expires_cookie() {
    let app = TestApp::new();
    let (_, cookie) = app.logged_in().await;

    let response = app.post_json("/api/auth/logout", json!({}), Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let header = set_cookie_header(&response);
    assert!(header.starts_with("accessToken=;"));
    assert!(header.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_register_is_not_mounted_by_default() {
    let app = TestApp::new();

    let response = app
        .post_json(
            "/api/auth/register",
            json!({
                "username": unique_username(),
                "email": SafeEmail().fake::<String>(),
                "password": TEST_PASSWORD,
            }),
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_register_then_login() {
    let app = TestApp::with_registration();
    let username = unique_username();

    let response = app
        .post_json(
            "/api/auth/register",
            json!({
                "username": username,
                "email": SafeEmail().fake::<String>(),
                "password": TEST_PASSWORD,
            }),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let cookie = app.login(&username, TEST_PASSWORD).await;
    let me = body_json(app.get("/api/auth/me", Some(&cookie)).await).await;
    assert_eq!(me["username"], username);
}

#[tokio::test]
async fn test_register_duplicate_username_conflicts() {
    let app = TestApp::with_registration();
    let seeded = app.seed_admin().await;

    let response = app
        .post_json(
            "/api/auth/register",
            json!({
                "username": seeded.username,
                "email": "someone.else@example.com",
                "password": TEST_PASSWORD,
            }),
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["type"], "DUPLICITY");
}

#[tokio::test]
async fn test_register_rejects_short_password() {
    let app = TestApp::with_registration();

    let response = app
        .post_json(
            "/api/auth/register",
            json!({
                "username": unique_username(),
                "email": SafeEmail().fake::<String>(),
                "password": "short",
            }),
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["details"][0]["field"], "password");
}
