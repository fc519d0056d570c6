//! Movie CRUD over HTTP

mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::{Value, json};

#[tokio::test]
async fn test_create_movie() {
    let server = server();

    let response = server
        .post("/movies")
        .authorization_bearer(token(&["post:movies"]))
        .json(&json!({"title": "Supermen", "release_date": "12.02.2014"}))
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["success"], true);
    assert_eq!(body["movie"]["title"], "Supermen");
    assert_eq!(body["movie"]["release_date"], "2014-02-12");
    assert_eq!(body["movie"]["actors"], json!([]));
    assert!(body["movie"]["id"].as_i64().unwrap() >= 1);
}

#[tokio::test]
async fn test_create_assigns_increasing_ids() {
    let server = server();

    let first = create_movie(&server, "One", "01.01.2001").await;
    let second = create_movie(&server, "Two", "02.02.2002").await;

    assert!(second > first);
}

#[tokio::test]
async fn test_create_rejects_bad_date_format() {
    let server = server();

    for date in ["2014/02/12", "2014-02-12", "12.2.2014", "32.01.2014"] {
        let response = server
            .post("/movies")
            .authorization_bearer(admin_token())
            .json(&json!({"title": "Supermen", "release_date": date}))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body = response.json::<Value>();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], 422);
    }
}

#[tokio::test]
async fn test_create_requires_both_fields() {
    let server = server();

    let response = server
        .post("/movies")
        .authorization_bearer(admin_token())
        .json(&json!({"title": "Supermen"}))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_create_rejects_long_title() {
    let server = server();

    let response = server
        .post("/movies")
        .authorization_bearer(admin_token())
        .json(&json!({"title": "x".repeat(81), "release_date": "12.02.2014"}))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_create_without_release_date_value() {
    let server = server();

    let response = server
        .post("/movies")
        .authorization_bearer(admin_token())
        .json(&json!({"title": "Untitled", "release_date": null}))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["movie"]["release_date"], Value::Null);
}

#[tokio::test]
async fn test_list_movies_ordered_by_id() {
    let server = server();
    create_movie(&server, "One", "01.01.2001").await;
    create_movie(&server, "Two", "02.02.2002").await;

    let response = server
        .get("/movies")
        .authorization_bearer(token(&["get:movies"]))
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    let titles: Vec<&str> = body["movies"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["One", "Two"]);
    assert_eq!(body["movies"][0]["actors"], json!([]));
}

#[tokio::test]
async fn test_list_movies_empty() {
    let server = server();

    let response = server
        .get("/movies")
        .authorization_bearer(token(&["get:movies"]))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["movies"], json!([]));
}

#[tokio::test]
async fn test_patch_title_keeps_release_date() {
    let server = server();
    let id = create_movie(&server, "Supermen", "12.02.2014").await;

    let response = server
        .patch(&format!("/movies/{id}"))
        .authorization_bearer(token(&["patch:movies"]))
        .json(&json!({"title": "Batmen"}))
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["movie"]["title"], "Batmen");
    assert_eq!(body["movie"]["release_date"], "2014-02-12");
}

#[tokio::test]
async fn test_patch_release_date_keeps_title() {
    let server = server();
    let id = create_movie(&server, "Supermen", "12.02.2014").await;

    let response = server
        .patch(&format!("/movies/{id}"))
        .authorization_bearer(admin_token())
        .json(&json!({"release_date": "01.03.2015"}))
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["movie"]["title"], "Supermen");
    assert_eq!(body["movie"]["release_date"], "2015-03-01");
}

#[tokio::test]
async fn test_patch_can_clear_release_date() {
    let server = server();
    let id = create_movie(&server, "Supermen", "12.02.2014").await;

    let response = server
        .patch(&format!("/movies/{id}"))
        .authorization_bearer(admin_token())
        .json(&json!({"release_date": null}))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["movie"]["release_date"], Value::Null);
}

#[tokio::test]
async fn test_patch_null_title_is_unprocessable() {
    let server = server();
    let id = create_movie(&server, "Supermen", "12.02.2014").await;

    let response = server
        .patch(&format!("/movies/{id}"))
        .authorization_bearer(admin_token())
        .json(&json!({"title": null}))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_patch_without_known_fields_is_unprocessable() {
    let server = server();
    let id = create_movie(&server, "Supermen", "12.02.2014").await;

    let response = server
        .patch(&format!("/movies/{id}"))
        .authorization_bearer(admin_token())
        .json(&json!({"director": "Someone"}))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_patch_missing_movie() {
    let server = server();

    let response = server
        .patch("/movies/999")
        .authorization_bearer(admin_token())
        .json(&json!({"title": "Ghost"}))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body = response.json::<Value>();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], 404);
    assert_eq!(body["error"]["message"], "Resource not found");
}

#[tokio::test]
async fn test_delete_movie() {
    let server = server();
    let id = create_movie(&server, "Supermen", "12.02.2014").await;

    let response = server
        .delete(&format!("/movies/{id}"))
        .authorization_bearer(token(&["delete:movies"]))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({"success": true, "delete": id}));

    let list = server
        .get("/movies")
        .authorization_bearer(admin_token())
        .await
        .json::<Value>();
    assert_eq!(list["movies"], json!([]));
}

#[tokio::test]
async fn test_delete_missing_movie() {
    let server = server();

    let response = server
        .delete("/movies/42")
        .authorization_bearer(admin_token())
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_integer_id_is_not_found() {
    let server = server();

    let response = server
        .delete("/movies/abc")
        .authorization_bearer(admin_token())
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"]["code"], 404);
}
