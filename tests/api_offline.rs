//! The HTTP surface against a database that cannot be reached.

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use chrono::Utc;
use serde_json::{Value, json};
use storefront_api::{
    config::AppConfig,
    models::{Role, User},
    routes::app,
    services::auth_service::issue_token,
    state::AppState,
};
use tower::ServiceExt;

const SECRET: &str = "offline-test-secret";
const UNREACHABLE: &str = "mongodb://127.0.0.1:9/?serverSelectionTimeoutMS=200&connectTimeoutMS=200";

fn offline_app() -> Router {
    let config = AppConfig::new(UNREACHABLE, SECRET);
    app(AppState::from_config(&config).expect("state"))
}

fn token(role: Role) -> String {
    let user = User {
        id: "665f00000000000000000001".into(),
        name: "Tester".into(),
        email: "tester@example.com".into(),
        password_hash: String::new(),
        role,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    issue_token(&user, SECRET).expect("token")
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn category_list_degrades_to_empty() {
    let (status, body) = send(offline_app(), get("/api/categories")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn homepage_content_degrades_to_empty() {
    let (status, body) = send(offline_app(), get("/api/hero-slides?active=true")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn malformed_query_is_a_400_with_error_body() {
    for uri in ["/api/categories?limit=abc", "/api/reviews?featured=maybe"] {
        let (status, body) = send(offline_app(), get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].is_string(), "{uri}: {body}");
    }

    let user = token(Role::User);
    let request = Request::builder()
        .uri("/api/orders?sortOrder=sideways")
        .header(header::AUTHORIZATION, format!("Bearer {user}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(offline_app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn product_list_reports_connection_failure() {
    let (status, body) = send(offline_app(), get("/api/products")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Database connection failed");
}

#[tokio::test]
async fn order_without_customer_is_rejected_before_writing() {
    let request = post_json(
        "/api/orders",
        json!({
            "items": [{"id": "p1", "name": "Lamp", "price": 10, "quantity": 1}],
            "paymentMethod": "cod"
        }),
        None,
    );
    let (status, body) = send(offline_app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Required fields missing" }));
}

#[tokio::test]
async fn malformed_json_is_a_400_with_error_body() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/orders")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(offline_app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn admin_writes_need_a_token() {
    let request = post_json("/api/products", json!({ "name": "Lamp", "price": 10 }), None);
    let (status, _) = send(offline_app(), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let user = token(Role::User);
    let request = post_json(
        "/api/products",
        json!({ "name": "Lamp", "price": 10 }),
        Some(&user),
    );
    let (status, _) = send(offline_app(), request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn product_create_validates_required_fields() {
    let admin = token(Role::Admin);
    let request = post_json("/api/products", json!({ "description": "d" }), Some(&admin));
    let (status, body) = send(offline_app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Required fields missing");
}

#[tokio::test]
async fn cart_belongs_to_its_owner() {
    let user = token(Role::User);
    let request = Request::builder()
        .uri("/api/cart/someone-else")
        .header(header::AUTHORIZATION, format!("Bearer {user}"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(offline_app(), request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unknown_routes_are_json_404s() {
    let (status, body) = send(offline_app(), get("/api/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}
