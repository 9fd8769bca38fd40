//! Entity CRUD API Tests
//!
//! Every entity is served by the same handlers, so most behavior is
//! checked once against a representative collection and the round trip
//! is checked for all of them.

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use test_case::test_case;

use crate::common::{body_json, TestApp};

const UNUSED_ID: &str = "65f0c0ffee0000000000abcd";

fn blog_post(title: &str) -> Value {
    json!({ "title": title, "content": "Body text", "tags": ["rust"] })
}

async fn create(app: &TestApp, cookie: &str, path: &str, body: Value) -> Value {
    let response = app.post_json(path, body, Some(cookie)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[test_case("/api/blog-posts", json!({ "title": "Hello World", "content": "First post" }), "title", json!({ "title": "Hello Again" }) ; "blog posts")]
#[test_case("/api/projects", json!({ "title": "Portfolio", "description": "This site" }), "title", json!({ "featured": true }) ; "projects")]
#[test_case("/api/skills", json!({ "name": "Rust", "category": "Languages", "level": 80 }), "name", json!({ "level": 90 }) ; "skills")]
#[test_case("/api/education", json!({ "title": "BSc Computer Science", "institution": "Uni", "startDate": "2015-09-01" }), "title", json!({ "endDate": "2019-06-30" }) ; "education")]
#[test_case("/api/experience", json!({ "title": "Engineer", "company": "Acme", "startDate": "2020-01-01", "current": true }), "title", json!({ "location": "Remote" }) ; "experience")]
#[tokio::test]
async fn test_entity_round_trip(path: &str, new: Value, key: &str, patch: Value) {
    let app = TestApp::new();
    let (_, cookie) = app.logged_in().await;

    let created = create(&app, &cookie, path, new.clone()).await;
    let id = created["_id"].as_str().unwrap().to_string();
    assert_eq!(created[key], new[key]);
    assert!(created["createdAt"].is_string());

    let item = format!("{}/{}", path, id);
    let fetched = body_json(app.get(&item, Some(&cookie)).await).await;
    assert_eq!(fetched, created);

    let response = app.patch_json(&item, patch.clone(), &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    let (field, value) = patch.as_object().unwrap().iter().next().unwrap();
    assert_eq!(&updated[field], value);
    assert_eq!(updated["createdAt"], created["createdAt"]);

    let response = app.delete(&item, &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["_id"], id.as_str());

    let response = app.get(&item, Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_round_trip_hides_password_hash() {
    let app = TestApp::new();
    let (_, cookie) = app.logged_in().await;

    let created = create(
        &app,
        &cookie,
        "/api/admins",
        json!({ "username": "second_admin", "email": "second@example.com", "password": "an0ther-secret" }),
    )
    .await;
    assert!(created.get("passwordHash").is_none());
    assert!(created.get("password").is_none());

    let item = format!("/api/admins/{}", created["_id"].as_str().unwrap());
    let fetched = body_json(app.get(&item, Some(&cookie)).await).await;
    assert_eq!(fetched, created);
    assert_eq!(fetched["username"], "second_admin");

    let second_cookie = app.login("second_admin", "an0ther-secret").await;
    assert_eq!(app.get("/api/auth/me", Some(&second_cookie)).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_slug_is_derived_from_title() {
    let app = TestApp::new();
    let (_, cookie) = app.logged_in().await;

    let created = create(&app, &cookie, "/api/blog-posts", blog_post("  Hello, Rust World!  ")).await;

    assert_eq!(created["title"], "Hello, Rust World!");
    assert_eq!(created["slug"], "hello-rust-world");
}

#[tokio::test]
async fn test_non_latin_titles_get_slugs() {
    let app = TestApp::new();
    let (_, cookie) = app.logged_in().await;

    let created = create(&app, &cookie, "/api/blog-posts", blog_post("Портфолио")).await;

    assert_eq!(created["slug"], "портфолио");
}

#[tokio::test]
async fn test_accented_title_does_not_collide_with_its_ascii_prefix() {
    let app = TestApp::new();
    let (_, cookie) = app.logged_in().await;
    create(&app, &cookie, "/api/blog-posts", blog_post("Café")).await;

    let created = create(&app, &cookie, "/api/blog-posts", blog_post("Caf")).await;

    assert_eq!(created["slug"], "caf");
}

#[test_case("/api/blog-posts" ; "blog posts")]
#[test_case("/api/admins" ; "admins")]
#[test_case("/api/skills" ; "skills")]
#[tokio::test]
async fn test_routes_require_session(path: &str) {
    let app = TestApp::new();

    let response = app.get(path, None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["type"], "AUTHORIZATION");
}

#[tokio::test]
async fn test_duplicate_title_conflicts() {
    let app = TestApp::new();
    let (_, cookie) = app.logged_in().await;
    create(&app, &cookie, "/api/blog-posts", blog_post("Same Title")).await;

    let response = app
        .post_json("/api/blog-posts", blog_post("Same Title"), Some(&cookie))
        .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["type"], "DUPLICITY");
    assert!(body["error"].as_str().unwrap().starts_with("Blog post"));
}

#[tokio::test]
async fn test_update_into_existing_title_conflicts() {
    let app = TestApp::new();
    let (_, cookie) = app.logged_in().await;
    create(&app, &cookie, "/api/blog-posts", blog_post("First")).await;
    let second = create(&app, &cookie, "/api/blog-posts", blog_post("Second")).await;
    let item = format!("/api/blog-posts/{}", second["_id"].as_str().unwrap());

    let response = app.patch_json(&item, json!({ "title": "First" }), &cookie).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_update_keeping_own_title_is_allowed() {
    let app = TestApp::new();
    let (_, cookie) = app.logged_in().await;
    let post = create(&app, &cookie, "/api/blog-posts", blog_post("Mine")).await;
    let item = format!("/api/blog-posts/{}", post["_id"].as_str().unwrap());

    let response = app
        .patch_json(&item, json!({ "title": "Mine", "published": true }), &cookie)
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["published"], true);
}

#[tokio::test]
async fn test_list_is_paginated_newest_first() {
    let app = TestApp::new();
    let (_, cookie) = app.logged_in().await;
    for title in ["one", "two", "three"] {
        create(&app, &cookie, "/api/blog-posts", blog_post(title)).await;
    }

    let response = app.get("/api/blog-posts?page=1&limit=2", Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total"], 3);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 2);
    let titles: Vec<&str> = body["blogPosts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["three", "two"]);

    let second = body_json(app.get("/api/blog-posts?page=2&limit=2", Some(&cookie)).await).await;
    assert_eq!(second["blogPosts"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_list_limit_is_capped() {
    let app = TestApp::new();
    let (_, cookie) = app.logged_in().await;

    let body = body_json(app.get("/api/skills?limit=100000", Some(&cookie)).await).await;

    assert_eq!(body["limit"], 100);
    assert_eq!(body["skills"], json!([]));
    assert_eq!(body["totalPages"], 0);
}

#[test_case("/api/skills?page=0" ; "zero page")]
#[test_case("/api/skills?limit=0" ; "zero limit")]
#[test_case("/api/skills?page=abc" ; "non numeric page")]
#[tokio::test]
async fn test_bad_paging_is_a_validation_error(uri: &str) {
    let app = TestApp::new();
    let (_, cookie) = app.logged_in().await;

    let response = app.get(uri, Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_filters() {
    let app = TestApp::new();
    let (_, cookie) = app.logged_in().await;
    create(&app, &cookie, "/api/skills", json!({ "name": "Rust", "category": "Languages" })).await;
    create(&app, &cookie, "/api/skills", json!({ "name": "Postgres", "category": "Databases" })).await;
    create(&app, &cookie, "/api/blog-posts", json!({ "title": "Draft", "content": "x" })).await;
    create(
        &app,
        &cookie,
        "/api/blog-posts",
        json!({ "title": "Live", "content": "x", "published": true, "tags": ["rust"] }),
    )
    .await;

    let skills = body_json(app.get("/api/skills?category=Databases", Some(&cookie)).await).await;
    assert_eq!(skills["total"], 1);
    assert_eq!(skills["skills"][0]["name"], "Postgres");

    let published = body_json(app.get("/api/blog-posts?published=true", Some(&cookie)).await).await;
    assert_eq!(published["total"], 1);
    assert_eq!(published["blogPosts"][0]["title"], "Live");

    let tagged = body_json(app.get("/api/blog-posts?tag=rust", Some(&cookie)).await).await;
    assert_eq!(tagged["total"], 1);
}

#[tokio::test]
async fn test_invalid_id_is_a_validation_error() {
    let app = TestApp::new();
    let (_, cookie) = app.logged_in().await;

    let response = app.get("/api/projects/not-an-id", Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["details"][0]["field"], "id");
}

#[tokio::test]
async fn test_missing_record_is_not_found() {
    let app = TestApp::new();
    let (_, cookie) = app.logged_in().await;
    let item = format!("/api/projects/{}", UNUSED_ID);

    assert_eq!(app.get(&item, Some(&cookie)).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        app.patch_json(&item, json!({ "featured": true }), &cookie).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(app.delete(&item, &cookie).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_empty_patch_is_rejected() {
    let app = TestApp::new();
    let (_, cookie) = app.logged_in().await;
    let skill = create(&app, &cookie, "/api/skills", json!({ "name": "Go", "category": "Languages" })).await;
    let item = format!("/api/skills/{}", skill["_id"].as_str().unwrap());

    let response = app.patch_json(&item, json!({}), &cookie).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_body_is_a_validation_error() {
    let app = TestApp::new();
    let (_, cookie) = app.logged_in().await;

    let response = app
        .post_json("/api/projects", json!({ "title": 42 }), Some(&cookie))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["type"], "VALIDATION");
}

#[tokio::test]
async fn test_current_experience_cannot_have_end_date() {
    let app = TestApp::new();
    let (_, cookie) = app.logged_in().await;

    let response = app
        .post_json(
            "/api/experience",
            json!({
                "title": "Engineer",
                "company": "Acme",
                "startDate": "2020-01-01",
                "endDate": "2021-01-01",
                "current": true,
            }),
            Some(&cookie),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["details"][0]["field"], "endDate");
}

#[tokio::test]
async fn test_end_date_on_current_experience_is_rejected() {
    let app = TestApp::new();
    let (_, cookie) = app.logged_in().await;
    let job = create(
        &app,
        &cookie,
        "/api/experience",
        json!({ "title": "Engineer", "company": "Acme", "startDate": "2020-01-01", "current": true }),
    )
    .await;
    let item = format!("/api/experience/{}", job["_id"].as_str().unwrap());

    let response = app.patch_json(&item, json!({ "endDate": "2022-01-01" }), &cookie).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["details"][0]["field"], "endDate");
    let stored = body_json(app.get(&item, Some(&cookie)).await).await;
    assert_eq!(stored["current"], true);
    assert_eq!(stored["endDate"], Value::Null);
}

#[tokio::test]
async fn test_leaving_a_current_position_with_end_date_is_allowed() {
    let app = TestApp::new();
    let (_, cookie) = app.logged_in().await;
    let job = create(
        &app,
        &cookie,
        "/api/experience",
        json!({ "title": "Engineer", "company": "Acme", "startDate": "2020-01-01", "current": true }),
    )
    .await;
    let item = format!("/api/experience/{}", job["_id"].as_str().unwrap());

    let response = app
        .patch_json(&item, json!({ "current": false, "endDate": "2022-01-01" }), &cookie)
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["endDate"], "2022-01-01");
}

#[tokio::test]
async fn test_project_end_date_before_stored_start_is_rejected() {
    let app = TestApp::new();
    let (_, cookie) = app.logged_in().await;
    let project = create(
        &app,
        &cookie,
        "/api/projects",
        json!({ "title": "Portfolio", "description": "This site", "startDate": "2024-06-01" }),
    )
    .await;
    let item = format!("/api/projects/{}", project["_id"].as_str().unwrap());

    let response = app.patch_json(&item, json!({ "endDate": "2024-01-01" }), &cookie).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let stored = body_json(app.get(&item, Some(&cookie)).await).await;
    assert_eq!(stored["endDate"], Value::Null);
}

#[tokio::test]
async fn test_admins_listing_hides_password_hashes() {
    let app = TestApp::new();
    let (seeded, cookie) = app.logged_in().await;

    let body = body_json(app.get("/api/admins", Some(&cookie)).await).await;

    assert_eq!(body["total"], 1);
    assert_eq!(body["admins"][0]["username"], seeded.username);
    assert!(body["admins"][0].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = TestApp::new();

    let response = app.get("/api/nothing-here", None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["type"], "NOT_FOUND");
}
