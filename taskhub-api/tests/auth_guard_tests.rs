/// Request handling that never reaches the database
///
/// The router runs over a lazily connected pool pointing at a closed port,
/// so every request here must be answered before a query is issued.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use chrono::Duration;
use common::{lazy_app, send, SECRET};
use serde_json::json;
use taskhub_shared::auth::jwt::{create_token, Claims, TokenPurpose};
use tower::Service as _;
use uuid::Uuid;

async fn unauthorized_with(header_value: Option<String>) {
    let app = lazy_app();

    let mut builder = Request::builder().method(Method::GET).uri("/tasks");
    if let Some(value) = header_value {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    let response = app
        .clone()
        .call(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Bearer"
    );

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_missing_authorization_header() {
    unauthorized_with(None).await;
}

#[tokio::test]
async fn test_non_bearer_scheme() {
    unauthorized_with(Some("Basic dXNlcjpwYXNz".to_string())).await;
}

#[tokio::test]
async fn test_empty_bearer_token() {
    unauthorized_with(Some("Bearer ".to_string())).await;
}

#[tokio::test]
async fn test_garbage_token() {
    unauthorized_with(Some("Bearer not.a.jwt".to_string())).await;
}

#[tokio::test]
async fn test_token_signed_with_other_secret() {
    let claims = Claims::new(Uuid::new_v4(), TokenPurpose::Access).unwrap();
    let token = create_token(&claims, "some-other-secret-that-is-long-enough").unwrap();
    unauthorized_with(Some(format!("Bearer {}", token))).await;
}

#[tokio::test]
async fn test_reset_token_is_not_an_access_token() {
    let claims = Claims::new(Uuid::new_v4(), TokenPurpose::ResetPassword)
        .unwrap()
        .with_password_fingerprint("abc".to_string());
    let token = create_token(&claims, SECRET).unwrap();
    unauthorized_with(Some(format!("Bearer {}", token))).await;
}

#[tokio::test]
async fn test_expired_token() {
    // Well past the validation leeway
    let claims =
        Claims::with_expiration(Uuid::new_v4(), TokenPurpose::Access, Duration::seconds(-600))
            .unwrap();
    let token = create_token(&claims, SECRET).unwrap();
    unauthorized_with(Some(format!("Bearer {}", token))).await;
}

#[tokio::test]
async fn test_every_protected_route_requires_a_token() {
    let app = lazy_app();
    let id = Uuid::new_v4();

    let routes = [
        (Method::GET, "/tasks".to_string()),
        (Method::POST, "/tasks".to_string()),
        (Method::GET, "/tasks/1".to_string()),
        (Method::PUT, "/tasks/1".to_string()),
        (Method::DELETE, "/tasks/1".to_string()),
        (Method::GET, "/users/me".to_string()),
        (Method::PATCH, "/users/me".to_string()),
        (Method::GET, "/users".to_string()),
        (Method::POST, "/users".to_string()),
        (Method::GET, format!("/users/{}", id)),
        (Method::PATCH, format!("/users/{}", id)),
        (Method::POST, "/auth/jwt/logout".to_string()),
        (Method::GET, "/authenticated-route".to_string()),
    ];

    for (method, uri) in routes {
        let (status, _) = send(&app, method.clone(), &uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
    }
}

#[tokio::test]
async fn test_unknown_route() {
    let app = lazy_app();
    let (status, _) = send(&app, Method::GET, "/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_reports_degraded_without_database() {
    let app = lazy_app();
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"], "disconnected");
}

#[tokio::test]
async fn test_register_malformed_json() {
    let app = lazy_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"email\": "))
        .unwrap();

    let response = app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_missing_field() {
    let app = lazy_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "email": "king.arthur@camelot.bt" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_register_invalid_email() {
    let app = lazy_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "email": "not-an-email", "password": "guinevere" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "email");
}

#[tokio::test]
async fn test_register_short_password() {
    let app = lazy_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "email": "king.arthur@camelot.bt", "password": "short" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "password");
    assert_eq!(
        body["details"][0]["message"],
        "Password should be at least 8 characters"
    );
}

#[tokio::test]
async fn test_register_password_containing_email() {
    let app = lazy_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({
            "email": "arthur@camelot.bt",
            "password": "xx-ARTHUR@camelot.bt-xx"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["message"], "Password should not contain e-mail");
}

#[tokio::test]
async fn test_login_requires_form_body() {
    let app = lazy_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/jwt/login",
        None,
        Some(json!({ "username": "king.arthur@camelot.bt", "password": "guinevere" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["error"], "unsupported_media_type");
}

#[tokio::test]
async fn test_reset_password_with_bad_token() {
    let app = lazy_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/reset-password",
        None,
        Some(json!({ "token": "garbage", "password": "a-new-password" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "RESET_PASSWORD_BAD_TOKEN");
}

#[tokio::test]
async fn test_reset_password_rejects_access_token() {
    let app = lazy_app();
    let claims = Claims::new(Uuid::new_v4(), TokenPurpose::Access).unwrap();
    let token = create_token(&claims, SECRET).unwrap();

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/reset-password",
        None,
        Some(json!({ "token": token, "password": "a-new-password" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "RESET_PASSWORD_BAD_TOKEN");
}

#[tokio::test]
async fn test_verify_with_bad_token() {
    let app = lazy_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/verify",
        None,
        Some(json!({ "token": "garbage" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "VERIFY_USER_BAD_TOKEN");
}
