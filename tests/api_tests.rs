use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use category_store::api::{create_router, AppState};
use category_store::db::InMemoryBackend;

fn create_test_server_with(backend: InMemoryBackend) -> TestServer {
    let state = AppState::with_backend(Arc::new(backend));
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

fn create_test_server() -> TestServer {
    create_test_server_with(InMemoryBackend::new())
}

async fn add(server: &TestServer, user_id: &str, category: &str) -> Value {
    let response = server
        .post("/add_recommendation/")
        .json(&json!({ "user_id": user_id, "category": category }))
        .await;
    response.assert_status_ok();
    response.json()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_add_recommendation() {
    let server = create_test_server();

    let body = add(&server, "alice", "tech").await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Recommendation added successfully");
    assert_eq!(
        body["data"],
        json!({ "user_id": "alice", "category": "tech", "recommendations": ["tech"] })
    );

    let body = add(&server, "alice", "tech").await;
    assert_eq!(body["data"]["recommendations"], json!(["tech", "tech"]));
}

#[tokio::test]
async fn test_get_recommendations_for_unknown_user() {
    let server = create_test_server();

    let response = server.get("/get_recommendations/bob").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "No recommendations found for this user");
    assert_eq!(body["data"], json!({ "user_id": "bob", "recommendations": [] }));
}

#[tokio::test]
async fn test_add_get_remove_scenario() {
    let server = create_test_server();

    add(&server, "alice", "tech").await;
    add(&server, "alice", "sports").await;

    let body: Value = server.get("/get_recommendations/alice").await.json();
    assert_eq!(body["message"], "Recommendations retrieved successfully");
    assert_eq!(body["data"]["recommendations"], json!(["tech", "sports"]));

    let response = server.delete("/remove_recommendation/alice/tech").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Recommendation removed successfully");
    assert_eq!(
        body["data"],
        json!({ "user_id": "alice", "removed_category": "tech", "recommendations": ["sports"] })
    );

    let body: Value = server.get("/get_recommendations/alice").await.json();
    assert_eq!(body["data"]["recommendations"], json!(["sports"]));

    let response = server.delete("/remove_recommendation/alice/tech").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body, json!({ "status": "error", "message": "Recommendation not found" }));

    let body: Value = server.get("/get_recommendations/bob").await.json();
    assert_eq!(body["data"]["recommendations"], json!([]));
}

#[tokio::test]
async fn test_remove_for_unknown_user_is_not_found() {
    let server = create_test_server();

    let response = server.delete("/remove_recommendation/ghost/tech").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "No recommendations found for this user");
}

#[tokio::test]
async fn test_remove_decodes_path_segments() {
    let server = create_test_server();
    add(&server, "alice", "sci fi").await;

    let response = server.delete("/remove_recommendation/alice/sci%20fi").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["removed_category"], "sci fi");
    assert_eq!(body["data"]["recommendations"], json!([]));
}

#[tokio::test]
async fn test_get_all_recommendations() {
    let server = create_test_server();

    let response = server.get("/get_all_recommendations/").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "No recommendations found for any user");
    assert_eq!(body["data"], json!([]));

    add(&server, "u2", "music").await;
    add(&server, "u1", "tech").await;
    add(&server, "u1", "sports").await;

    let body: Value = server.get("/get_all_recommendations/").await.json();
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "All recommendations retrieved successfully");
    assert_eq!(
        body["data"],
        json!([
            { "user_id": "u1", "recommendations": ["tech", "sports"] },
            { "user_id": "u2", "recommendations": ["music"] }
        ])
    );
}

#[tokio::test]
async fn test_get_all_reports_corrupt_record() {
    let backend = InMemoryBackend::new();
    backend
        .insert("user:mallory:recommendations", "definitely not json")
        .await;
    let server = create_test_server_with(backend);

    let response = server.get("/get_all_recommendations/").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["status"], "error");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("user:mallory:recommendations"));
}

#[tokio::test]
async fn test_add_rejects_malformed_body() {
    let server = create_test_server();

    let response = server
        .post("/add_recommendation/")
        .json(&json!({ "user_id": "alice" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["status"], "error");

    // nothing was stored
    let body: Value = server.get("/get_recommendations/alice").await.json();
    assert_eq!(body["data"]["recommendations"], json!([]));
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = create_test_server();

    let response = server
        .get("/get_recommendations/alice")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("trace-123"),
        )
        .await;
    assert_eq!(response.header("x-request-id"), "trace-123");

    let response = server.get("/get_recommendations/alice").await;
    assert!(!response.header("x-request-id").is_empty());
}

#[tokio::test]
async fn test_undecodable_path_uses_error_envelope() {
    let server = create_test_server();

    let response = server.get("/get_recommendations/%FF").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("user_id"));

    let response = server.delete("/remove_recommendation/alice/%FF").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("category"));
}

#[tokio::test]
async fn test_get_stored_empty_list_is_retrieved() {
    let backend = InMemoryBackend::new();
    backend.insert("user:carol:recommendations", "[]").await;
    let server = create_test_server_with(backend);

    let response = server.get("/get_recommendations/carol").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Recommendations retrieved successfully");
    assert_eq!(body["data"], json!({ "user_id": "carol", "recommendations": [] }));

    // emptied through remove behaves the same way
    add(&server, "dave", "tech").await;
    server
        .delete("/remove_recommendation/dave/tech")
        .await
        .assert_status_ok();
    let body: Value = server.get("/get_recommendations/dave").await.json();
    assert_eq!(body["message"], "Recommendations retrieved successfully");
    assert_eq!(body["data"]["recommendations"], json!([]));
}
