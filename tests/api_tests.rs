// tests/api_tests.rs

mod common;

use common::{PASSWORD, spawn_app, unique_name};
use serde_json::{Value, json};

#[tokio::test]
async fn health_check_404() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app
        .client
        .get(app.url("/random_path_that_does_not_exist"))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn register_works() {
    // Arrange
    let app = spawn_app().await;
    let username = unique_name("u");

    // Act
    let response = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&json!({ "username": username, "password": PASSWORD }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["username"], username.as_str());
    assert!(body.get("password").is_none(), "Password must never be serialized");
}

#[tokio::test]
async fn register_fails_validation() {
    // Arrange
    let app = spawn_app().await;

    // Act: Send a username that is too short
    let response = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&json!({ "username": "yo", "password": PASSWORD }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["fields"]["username"].is_array());
}

#[tokio::test]
async fn register_duplicate_username_conflicts() {
    let app = spawn_app().await;
    let username = unique_name("dup");
    let payload = json!({ "username": username, "password": PASSWORD });

    let first = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(first.status().as_u16(), 201);

    let second = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(second.status().as_u16(), 409);
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let app = spawn_app().await;
    let username = unique_name("u");

    app.client
        .post(app.url("/api/auth/register"))
        .json(&json!({ "username": username, "password": PASSWORD }))
        .send()
        .await
        .unwrap();

    let response = app
        .client
        .post(app.url("/api/auth/login"))
        .json(&json!({ "username": username, "password": "not-the-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);

    let unknown = app
        .client
        .post(app.url("/api/auth/login"))
        .json(&json!({ "username": unique_name("ghost"), "password": PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status().as_u16(), 401);
}

#[tokio::test]
async fn login_returns_bearer_token() {
    let app = spawn_app().await;
    let token = app.signup("u").await;

    assert!(!token.is_empty());

    let response = app.get(&token, "/api/subjects").await;
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn protected_routes_require_token() {
    let app = spawn_app().await;

    let missing = app
        .client
        .get(app.url("/api/subjects"))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 401);

    let forged = app
        .client
        .get(app.url("/api/recent-quizzes"))
        .bearer_auth("not.a.token")
        .send()
        .await
        .unwrap();
    assert_eq!(forged.status().as_u16(), 401);
}
