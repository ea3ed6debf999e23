use crate::api::handlers::api_routes;
use crate::auth::jwt::JwtService;
use crate::tests::{TEST_SECRET, add_expense, create_test_service, seed_roommates};
use chrono::Duration;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

async fn test_app() -> Router {
    let service = create_test_service();
    seed_roommates(&service).await;
    add_expense(&service, "alice", "Groceries", 90.0, &["bob", "carol"]).await;
    Router::new().nest("/api", api_routes(Arc::new(service)))
}

fn bearer(user_id: &str) -> String {
    let token = JwtService::new(TEST_SECRET.to_string())
        .generate_token(user_id, Duration::hours(1))
        .unwrap();
    format!("Bearer {}", token)
}

async fn send(app: &Router, method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(header::AUTHORIZATION, bearer(user));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn test_requests_without_valid_token_are_rejected() {
    let app = test_app().await;

    let (status, body) = send(&app, "GET", "/api/balances", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "unauthenticated");

    let request = Request::builder()
        .uri("/api/balances")
        .header(header::AUTHORIZATION, "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let expired = JwtService::new(TEST_SECRET.to_string())
        .generate_token("bob", Duration::hours(-2))
        .unwrap();
    let request = Request::builder()
        .uri("/api/balances")
        .header(header::AUTHORIZATION, format!("Bearer {}", expired))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_balances_and_settlement_over_http() {
    let app = test_app().await;

    let (status, body) = send(&app, "GET", "/api/balances", Some("bob"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["counterparty_id"], "alice");
    assert_eq!(body[0]["direction"], "owe");
    assert_eq!(body[0]["net_amount"], 30.0);
    let expense_id = body[0]["breakdown"][0]["expense_id"].as_str().unwrap().to_string();

    let uri = format!("/api/expenses/{}/participants/bob/settle", expense_id);
    let (status, body) = send(&app, "POST", &uri, Some("carol"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], "authorization");

    let (status, body) = send(&app, "POST", &uri, Some("bob"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["settlement_type"], "individual");

    let (status, body) = send(&app, "POST", &uri, Some("bob"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Participant bob is already settled");

    let (_, body) = send(&app, "GET", "/api/balances", Some("bob"), None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_expense_endpoints() {
    let app = test_app().await;

    let payload = json!({
        "title": "Electricity",
        "amount": 120.0,
        "category": "utilities",
        "participant_ids": ["alice", "carol"]
    });
    let (status, body) = send(&app, "POST", "/api/expenses", Some("bob"), Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["share"], 40.0);
    assert_eq!(body["status"]["label"], "0/2 paid");

    let invalid = json!({ "title": "Electricity", "amount": -1.0, "participant_ids": ["alice"] });
    let (status, body) = send(&app, "POST", "/api/expenses", Some("bob"), Some(invalid)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");

    let (status, body) = send(&app, "GET", "/api/expenses", Some("carol"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, _) = send(&app, "GET", "/api/expenses/nope", Some("carol"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_profile_and_history_endpoints() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        "PUT",
        "/api/profiles/me",
        Some("carol"),
        Some(json!({ "name": "Carol", "upi_id": "carol@okicici" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["upi_id"], "carol@okicici");

    let (status, body) = send(&app, "GET", "/api/profiles", Some("carol"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = send(
        &app,
        "GET",
        "/api/settlements/history?settlement_type=complete&date_range=week",
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = send(&app, "GET", "/api/analytics", Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["expense_count"], 1);
}
