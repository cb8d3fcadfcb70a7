//! API module tests - Integration tests
//!
//! These tests drive the router end to end with `oneshot` requests.

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use repsheet::api::AppState;
use repsheet::config::PositionConfig;
use repsheet::storage::{MemoryStore, WorkoutStore};
use repsheet::{PositionManager, SqliteStore};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn create_test_router() -> Router {
    let manager = PositionManager::new(MemoryStore::new(), PositionConfig::default());
    repsheet::api::router(Arc::new(AppState { manager }))
}

async fn create_sqlite_test_router() -> Router {
    let store = SqliteStore::in_memory().await.unwrap();
    store.migrate().await.unwrap();
    let manager = PositionManager::new(store, PositionConfig::default());
    repsheet::api::router(Arc::new(AppState { manager }))
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_user(router: &Router, name: &str) -> i64 {
    let (status, body) = send(router, "POST", "/users", Some(json!({ "name": name }))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

async fn add_workout(router: &Router, user_id: i64, name: &str, position: i32) -> Value {
    let (status, body) = send(
        router,
        "POST",
        &format!("/users/{user_id}/workouts"),
        Some(json!({ "name": name, "position": position })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

fn names(list: &Value) -> Vec<&str> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|w| w["name"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health_endpoint() {
    let router = create_test_router();

    let (status, body) = send(&router, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "healthy");
}

#[tokio::test]
async fn test_get_nonexistent_user() {
    let router = create_test_router();

    let (status, body) = send(&router, "GET", "/users/999", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found: 999");
}

#[tokio::test]
async fn test_get_nonexistent_workout() {
    let router = create_test_router();

    let (status, _) = send(&router, "GET", "/workouts/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&router, "DELETE", "/workouts/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &router,
        "POST",
        "/workouts/999/shift",
        Some(json!({ "position": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_workouts_absent_is_null() {
    let router = create_test_router();
    let user_id = create_user(&router, "sam").await;

    let (status, body) = send(&router, "GET", &format!("/users/{user_id}/workouts"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.is_null());
}

#[tokio::test]
async fn test_workouts_for_unknown_user() {
    let router = create_test_router();

    let (status, _) = send(&router, "GET", "/users/5/workouts", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &router,
        "POST",
        "/users/5/workouts",
        Some(json!({ "name": "squat", "position": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_insert_and_list_in_order() {
    let router = create_test_router();
    let user_id = create_user(&router, "sam").await;

    add_workout(&router, user_id, "A", 0).await;
    add_workout(&router, user_id, "C", 1).await;
    let b = add_workout(&router, user_id, "B", 1).await;
    assert_eq!(b["position"], 1);
    assert_eq!(b["user_id"], user_id);

    let (status, list) = send(&router, "GET", &format!("/users/{user_id}/workouts"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&list), vec!["A", "B", "C"]);
}

#[tokio::test]
async fn test_insert_out_of_range_is_unprocessable() {
    let router = create_test_router();
    let user_id = create_user(&router, "sam").await;

    let (status, body) = send(
        &router,
        "POST",
        &format!("/users/{user_id}/workouts"),
        Some(json!({ "name": "A", "position": 3 })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Invalid position 3: expected 0..=0");
}

#[tokio::test]
async fn test_shift_returns_ordered_list() {
    let router = create_test_router();
    let user_id = create_user(&router, "sam").await;
    add_workout(&router, user_id, "A", 0).await;
    add_workout(&router, user_id, "B", 1).await;
    let c = add_workout(&router, user_id, "C", 2).await;

    let (status, list) = send(
        &router,
        "POST",
        &format!("/workouts/{}/shift", c["id"]),
        Some(json!({ "position": 0 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&list), vec!["C", "A", "B"]);
}

#[tokio::test]
async fn test_update_workout_keeps_position() {
    let router = create_test_router();
    let user_id = create_user(&router, "sam").await;
    add_workout(&router, user_id, "A", 0).await;
    let b = add_workout(&router, user_id, "B", 1).await;

    let (status, body) = send(
        &router,
        "PUT",
        &format!("/workouts/{}", b["id"]),
        Some(json!({ "name": "B2", "description": "paused", "heavy": 5 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "B2");
    assert_eq!(body["description"], "paused");
    assert_eq!(body["heavy"], 5);
    assert_eq!(body["position"], 1);
}

#[tokio::test]
async fn test_delete_workout_compacts() {
    let router = create_test_router();
    let user_id = create_user(&router, "sam").await;
    let a = add_workout(&router, user_id, "A", 0).await;
    add_workout(&router, user_id, "B", 1).await;

    let (status, removed) = send(&router, "DELETE", &format!("/workouts/{}", a["id"]), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed["name"], "A");

    let (_, list) = send(&router, "GET", &format!("/users/{user_id}/workouts"), None).await;
    assert_eq!(list[0]["name"], "B");
    assert_eq!(list[0]["position"], 0);
}

#[tokio::test]
async fn test_delete_all_workouts_no_content() {
    let router = create_test_router();
    let user_id = create_user(&router, "sam").await;
    add_workout(&router, user_id, "A", 0).await;

    let (status, body) = send(&router, "DELETE", &format!("/users/{user_id}/workouts"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (_, list) = send(&router, "GET", &format!("/users/{user_id}/workouts"), None).await;
    assert!(list.is_null());
}

#[tokio::test]
async fn test_sqlite_user_lifecycle() {
    let router = create_sqlite_test_router().await;
    let user_id = create_user(&router, "sam").await;
    let a = add_workout(&router, user_id, "A", 0).await;

    let (status, user) = send(&router, "GET", &format!("/users/{user_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["name"], "sam");

    let (status, _) = send(&router, "DELETE", &format!("/users/{user_id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&router, "GET", &format!("/workouts/{}", a["id"]), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&router, "DELETE", &format!("/users/{user_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sqlite_shift_and_health() {
    let router = create_sqlite_test_router().await;
    let user_id = create_user(&router, "sam").await;
    let a = add_workout(&router, user_id, "A", 0).await;
    add_workout(&router, user_id, "B", 1).await;
    add_workout(&router, user_id, "C", 2).await;

    let (status, list) = send(
        &router,
        "POST",
        &format!("/workouts/{}/shift", a["id"]),
        Some(json!({ "position": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&list), vec!["B", "C", "A"]);

    let (status, body) = send(&router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "healthy");
}
