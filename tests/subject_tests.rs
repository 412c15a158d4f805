// tests/subject_tests.rs

mod common;

use common::spawn_app;
use serde_json::{Value, json};

#[tokio::test]
async fn subject_crud_flow() {
    let app = spawn_app().await;
    let token = app.signup("owner").await;

    // Create
    let response = app
        .post(
            &token,
            "/api/subjects",
            json!({
                "title": "Biology",
                "description": "<p>Cells</p><script>alert(1)</script>",
                "image": "https://example.com/cell.png"
            }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 201);
    let id = response.json::<Value>().await.unwrap()["id"].as_i64().unwrap();

    // Read: description is sanitized, caller is owner
    let details: Value = app
        .get(&token, &format!("/api/subjects/{}", id))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(details["title"], "Biology");
    assert_eq!(details["description"], "<p>Cells</p>");
    assert_eq!(details["is_owner"], true);
    assert_eq!(details["is_favorited"], false);
    assert_eq!(details["total_quizzes"], 0);
    assert_eq!(details["avg_duration"], "0s");

    // Update
    let response = app
        .put(
            &token,
            &format!("/api/subjects/{}", id),
            json!({ "title": "Cell Biology" }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);

    let details: Value = app
        .get(&token, &format!("/api/subjects/{}", id))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(details["title"], "Cell Biology");
    assert_eq!(details["image"], "https://example.com/cell.png");

    // Null removes the image; markup that sanitizes to nothing clears the description
    let response = app
        .put(
            &token,
            &format!("/api/subjects/{}", id),
            json!({ "image": null, "description": "<script>alert(1)</script>" }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);

    let details: Value = app
        .get(&token, &format!("/api/subjects/{}", id))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(details["title"], "Cell Biology");
    assert!(details["image"].is_null());
    assert!(details["description"].is_null());

    // Delete
    let response = app.delete(&token, &format!("/api/subjects/{}", id)).await;
    assert_eq!(response.status().as_u16(), 204);

    let response = app.get(&token, &format!("/api/subjects/{}", id)).await;
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn subject_validation_errors() {
    let app = spawn_app().await;
    let token = app.signup("owner").await;

    let response = app
        .post(
            &token,
            "/api/subjects",
            json!({ "title": "", "image": "not a url" }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 400);

    let body: Value = response.json().await.unwrap();
    assert!(body["fields"]["title"].is_array());
    assert!(body["fields"]["image"].is_array());
}

#[tokio::test]
async fn subjects_are_paginated_newest_first() {
    let app = spawn_app().await;
    let token = app.signup("owner").await;

    for i in 1..=16 {
        app.create_subject(&token, &format!("Subject {}", i)).await;
    }

    let first: Value = app.get(&token, "/api/subjects").await.json().await.unwrap();
    assert_eq!(first["total"], 16);
    assert_eq!(first["per_page"], 15);
    assert_eq!(first["last_page"], 2);
    assert_eq!(first["data"].as_array().unwrap().len(), 15);
    assert_eq!(first["data"][0]["title"], "Subject 16");

    let second: Value = app
        .get(&token, "/api/subjects?page=2")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(second["current_page"], 2);
    assert_eq!(second["data"].as_array().unwrap().len(), 1);
    assert_eq!(second["data"][0]["title"], "Subject 1");

    // A page far past the end is empty, not an error
    let response = app
        .get(&token, &format!("/api/subjects?page={}", i64::MAX))
        .await;
    assert_eq!(response.status().as_u16(), 200);
    let far: Value = response.json().await.unwrap();
    assert_eq!(far["total"], 16);
    assert!(far["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn subjects_are_private_to_their_owner() {
    let app = spawn_app().await;
    let owner = app.signup("owner").await;
    let other = app.signup("other").await;

    let id = app.create_subject(&owner, "Chemistry").await;

    // The other user's index stays empty
    let list: Value = app.get(&other, "/api/subjects").await.json().await.unwrap();
    assert_eq!(list["total"], 0);

    // Mutations by a non-owner read as missing
    let response = app
        .put(&other, &format!("/api/subjects/{}", id), json!({ "title": "Mine" }))
        .await;
    assert_eq!(response.status().as_u16(), 404);

    let response = app.delete(&other, &format!("/api/subjects/{}", id)).await;
    assert_eq!(response.status().as_u16(), 404);

    // Viewing is allowed but flagged as not owned
    let details: Value = app
        .get(&other, &format!("/api/subjects/{}", id))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(details["is_owner"], false);
}

#[tokio::test]
async fn favorites_toggle_flow() {
    let app = spawn_app().await;
    let token = app.signup("fan").await;

    let first = app.create_subject(&token, "Physics").await;
    let second = app.create_subject(&token, "History").await;

    let toggled: Value = app
        .post(&token, &format!("/api/favorites/toggle/{}", first), json!({}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(toggled["is_favorited"], true);

    app.post(&token, &format!("/api/favorites/toggle/{}", second), json!({}))
        .await;

    let favorites: Vec<Value> = app.get(&token, "/api/favorites").await.json().await.unwrap();
    assert_eq!(favorites.len(), 2);
    assert_eq!(favorites[0]["id"], second);

    // Toggling again removes it
    let toggled: Value = app
        .post(&token, &format!("/api/favorites/toggle/{}", first), json!({}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(toggled["is_favorited"], false);

    let favorites: Vec<Value> = app.get(&token, "/api/favorites").await.json().await.unwrap();
    assert_eq!(favorites.len(), 1);

    let list: Value = app.get(&token, "/api/subjects").await.json().await.unwrap();
    let physics = list["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["id"] == first)
        .unwrap();
    assert_eq!(physics["is_favorited"], false);

    let response = app
        .post(&token, "/api/favorites/toggle/999999", json!({}))
        .await;
    assert_eq!(response.status().as_u16(), 404);
}
