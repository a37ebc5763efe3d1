use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use robotrader::{config::AppConfig, routes::create_app, state::AppState};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tower::ServiceExt;

// None of these requests reach the database, so a disconnected handle is enough.
fn app() -> axum::Router {
    let config = AppConfig::new("postgres://unused", "test-secret");
    create_app(AppState::new(DatabaseConnection::Disconnected, config))
}

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let response = app().oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_endpoint_is_public() {
    let (status, body) = send(get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn unknown_route_is_404() {
    let (status, body) = send(get("/api/nothing-here")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Not Found");
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    for uri in ["/api/users/profile", "/api/users/favorites", "/api/robots/user"] {
        let (status, body) = send(get(uri)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body["message"], "Please authenticate");
    }
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let request = Request::builder()
        .uri("/api/users/profile")
        .header(header::AUTHORIZATION, "Bearer not.a.jwt")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn creating_a_listing_requires_a_token() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/robots")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let (status, _) = send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_price_range_is_400() {
    let (status, body) = send(get("/api/robots?priceRange=abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["message"].as_str().unwrap_or_default().contains("priceRange"),
        "{body}"
    );
}

#[tokio::test]
async fn unknown_condition_is_400() {
    let (status, _) = send(get("/api/robots?condition=Broken")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_robot_id_is_400() {
    let (status, _) = send(get("/api/robots/not-a-uuid")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_validates_payload_before_touching_storage() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/users/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            r#"{"name":"Ann","email":"not-an-email","password":"secret1"}"#,
        ))
        .unwrap();
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"].is_array(), "{body}");
    assert_eq!(body["errors"][0]["field"], "email");
}

#[tokio::test]
async fn welcome_is_a_bare_message() {
    let (status, body) = send(get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({ "message": "Welcome to RoboTrader API" }));
}

// Seller messaging is not offered; the contact form gets a JSON 404.
#[tokio::test]
async fn messaging_endpoint_is_not_served() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/messages/send")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"robotId":"x","message":"hi"}"#))
        .unwrap();
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Not Found");
}
