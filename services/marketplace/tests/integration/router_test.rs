use axum::http::{HeaderName, HeaderValue, StatusCode, header};
use axum_test::TestServer;
use axum_test::multipart::MultipartForm;
use hmac::{Hmac, Mac};
use sea_orm::{DatabaseBackend, MockDatabase};
use serde_json::{Value, json};
use sha2::Sha256;

use learnhub_marketplace::config::MarketplaceConfig;
use learnhub_marketplace::infra::stripe::STRIPE_SIGNATURE;
use learnhub_marketplace::router::build_router;
use learnhub_marketplace::state::AppState;
use learnhub_marketplace::usecase::review::ReviewDeletePolicy;
use learnhub_testing::session::MockSession;

use crate::helpers::TEST_JWT_SECRET;

const TEST_WEBHOOK_SECRET: &str = "whsec_test";

fn test_config() -> MarketplaceConfig {
    MarketplaceConfig {
        database_url: "postgres://unused".into(),
        port: 0,
        jwt_secret: TEST_JWT_SECRET.into(),
        cookie_domain: None,
        cookie_secure: false,
        bcrypt_cost: 4,
        upload_dir: std::env::temp_dir(),
        max_upload_bytes: 1024 * 1024,
        stripe_secret_key: "sk_test".into(),
        stripe_webhook_secret: Some(TEST_WEBHOOK_SECRET.into()),
        stripe_api_base: "http://127.0.0.1:9".into(),
        frontend_success_url: "http://localhost:3000/success".into(),
        public_base_url: "http://localhost:5000".into(),
        cloudinary_cloud_name: "demo".into(),
        cloudinary_api_key: "key".into(),
        cloudinary_api_secret: "secret".into(),
        cloudinary_api_base: "http://127.0.0.1:9".into(),
        review_delete_policy: ReviewDeletePolicy::Any,
    }
}

/// Router over an empty mock database. Only requests that are rejected
/// before touching storage belong here.
fn test_server() -> TestServer {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let state = AppState::new(test_config(), db, reqwest::Client::new());
    TestServer::new(build_router(state)).unwrap()
}

fn stripe_signature(payload: &str, secret: &str) -> String {
    let timestamp = chrono::Utc::now().timestamp();
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(format!("{timestamp}.{payload}").as_bytes());
    format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
}

#[tokio::test]
async fn should_answer_health_probe() {
    let server = test_server();

    server.get("/healthz").await.assert_status_ok();
}

#[tokio::test]
async fn should_require_session_for_orders() {
    let server = test_server();

    let response = server.get("/api/v1/orders").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["kind"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn should_reject_forged_session() {
    let server = test_server();
    let forged = MockSession::admin().cookie("some-other-secret");

    server
        .get("/api/v1/orders")
        .add_header(header::COOKIE, forged)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_forbid_students_from_listing_orders() {
    let server = test_server();

    let response = server
        .get("/api/v1/orders")
        .add_header(header::COOKIE, MockSession::student().cookie(TEST_JWT_SECRET))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(response.json::<Value>()["kind"], "FORBIDDEN");
}

#[tokio::test]
async fn should_forbid_non_admins_from_listing_users() {
    let server = test_server();

    server
        .get("/api/v1/users")
        .add_header(header::COOKIE, MockSession::instructor().cookie(TEST_JWT_SECRET))
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn should_forbid_students_from_creating_courses() {
    let server = test_server();
    let form = MultipartForm::new()
        .add_text("title", "Sneaky")
        .add_text("price", "0");

    server
        .post("/api/v1/courses")
        .add_header(header::COOKIE, MockSession::student().cookie(TEST_JWT_SECRET))
        .multipart(form)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn should_reject_malformed_path_id() {
    let server = test_server();

    let response = server.get("/api/v1/courses/not-a-uuid").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["kind"], "INVALID_ID");
}

#[tokio::test]
async fn should_expire_cookie_on_logout() {
    let server = test_server();

    let response = server.get("/api/v1/auth/logout").await;

    response.assert_status_ok();
    let cookie = response.header(header::SET_COOKIE);
    let cookie = cookie.to_str().unwrap();
    assert!(cookie.starts_with("learnhub_token=logout"), "got {cookie}");
    response.assert_json(&json!({ "msg": "user logged out" }));
}

#[tokio::test]
async fn should_reject_unsigned_webhook() {
    let server = test_server();

    let response = server
        .post("/api/v1/payments/webhook")
        .text(r#"{"type":"checkout.session.completed"}"#)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["kind"], "INVALID_SIGNATURE");
}

#[tokio::test]
async fn should_reject_webhook_signed_with_wrong_secret() {
    let server = test_server();
    let payload = r#"{"type":"checkout.session.expired","data":{"object":{"id":"cs_1"}}}"#;
    let signature = stripe_signature(payload, "whsec_wrong");

    server
        .post("/api/v1/payments/webhook")
        .add_header(HeaderName::from_static(STRIPE_SIGNATURE), HeaderValue::from_str(&signature).unwrap())
        .text(payload)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn should_acknowledge_irrelevant_signed_webhook() {
    let server = test_server();
    let payload = r#"{"type":"customer.created","data":{"object":{"id":"cus_1"}}}"#;
    let signature = stripe_signature(payload, TEST_WEBHOOK_SECRET);

    let response = server
        .post("/api/v1/payments/webhook")
        .add_header(HeaderName::from_static(STRIPE_SIGNATURE), HeaderValue::from_str(&signature).unwrap())
        .text(payload)
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({ "received": true }));
}

#[tokio::test]
async fn should_answer_payment_redirects() {
    let server = test_server();

    server
        .get("/api/v1/payments/success")
        .add_query_param("session_id", "cs_test_1")
        .await
        .assert_json(&json!({ "msg": "payment successful" }));
    server
        .get("/api/v1/payments/cancel")
        .await
        .assert_json(&json!({ "msg": "payment cancelled" }));
}

#[tokio::test]
async fn should_answer_mistyped_json_field_with_error_body() {
    let server = test_server();

    let response = server
        .post("/api/v1/reviews")
        .add_header(header::COOKIE, MockSession::student().cookie(TEST_JWT_SECRET))
        .json(&json!({ "courseId": "x", "rating": "5" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["kind"], "INVALID_BODY");
    assert!(
        body["msg"].as_str().unwrap().contains("rating"),
        "got {body}"
    );
}

#[tokio::test]
async fn should_answer_malformed_page_with_error_body() {
    let server = test_server();

    let response = server.get("/api/v1/courses").add_query_param("page", "abc").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["kind"], "INVALID_BODY");
}

#[tokio::test]
async fn should_answer_non_multipart_upload_with_error_body() {
    let server = test_server();

    let response = server
        .post("/api/v1/courses")
        .add_header(header::COOKIE, MockSession::instructor().cookie(TEST_JWT_SECRET))
        .json(&json!({ "title": "Not a form" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["kind"], "INVALID_BODY");
}
