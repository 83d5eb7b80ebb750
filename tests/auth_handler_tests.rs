mod common;

use axum::http::{header::SET_COOKIE, Method, StatusCode};
use serde_json::json;

use common::{TestApp, VALID_OTP};
use template_service::{config::AppConfig, handlers::auth::refresh_token_cookie};

#[tokio::test]
async fn test_send_otp_uses_default_country_code() {
    let app = TestApp::new();

    let (response, body) = app
        .json(
            Method::POST,
            "/api/v1/auth/send-otp",
            json!({ "mobileNumber": "9121234567" }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["result"].is_null());
    assert_eq!(*app.auth.sent_to.lock().unwrap(), vec!["+989121234567".to_string()]);
}

#[tokio::test]
async fn test_send_otp_keeps_explicit_country_code() {
    let app = TestApp::new();

    let (response, _) = app
        .json(
            Method::POST,
            "/api/v1/auth/send-otp",
            json!({ "countryCode": "+1", "mobileNumber": "5551234567" }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(*app.auth.sent_to.lock().unwrap(), vec!["+15551234567".to_string()]);
}

#[tokio::test]
async fn test_send_otp_validates_phone() {
    let app = TestApp::new();

    let (response, body) = app
        .json(
            Method::POST,
            "/api/v1/auth/send-otp",
            json!({ "countryCode": "98", "mobileNumber": "12ab" }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let properties: Vec<&str> = body["error"]["validationErrors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["property"].as_str().unwrap())
        .collect();
    assert_eq!(properties, vec!["country_code", "mobile_number"]);
    assert!(app.auth.sent_to.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_send_otp_surfaces_auth_service_conflict() {
    let app = TestApp::new();
    app.auth.fail_send_with(409);

    let (response, body) = app
        .json(
            Method::POST,
            "/api/v1/auth/send-otp",
            json!({ "mobileNumber": "9121234567" }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body["resultCode"], 40901);
}

#[tokio::test]
async fn test_send_otp_surfaces_rejected_credentials() {
    let app = TestApp::new();
    app.auth.fail_send_with(401);

    let (response, body) = app
        .json(
            Method::POST,
            "/api/v1/auth/send-otp",
            json!({ "mobileNumber": "9121234567" }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body["resultCode"], 40101);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_send_otp_surfaces_rate_limit() {
    let app = TestApp::new();
    app.auth.fail_send_with(429);

    let (response, body) = app
        .json(
            Method::POST,
            "/api/v1/auth/send-otp",
            json!({ "mobileNumber": "9121234567" }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"]["code"], "TOO_MANY_REQUESTS");
}

#[tokio::test]
async fn test_login_with_wrong_otp_creates_no_user() {
    let app = TestApp::new();

    let (response, body) = app
        .json(
            Method::POST,
            "/api/v1/auth/login-by-mobile",
            json!({ "mobileNumber": "9121234567", "otp": "000000" }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "INVALID_OTP");
    assert!(response.headers().get(SET_COOKIE).is_none());
    assert_eq!(app.users.count(), 0);
}

#[tokio::test]
async fn test_login_returns_tokens_and_sets_cookie() {
    let app = TestApp::new();

    let (response, body) = app
        .json(
            Method::POST,
            "/api/v1/auth/login-by-mobile",
            json!({ "mobileNumber": "9121234567", "otp": VALID_OTP }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body["result"]["accessToken"], "access-alice");
    assert_eq!(body["result"]["refreshToken"], "refresh-alice");

    let cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.starts_with("refresh_token=refresh-alice;"));
    assert!(cookie.contains("Max-Age=604800"));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Secure"));
    assert!(cookie.contains("SameSite=Strict"));

    assert_eq!(app.users.user_ids(), vec!["ext-42".to_string()]);
    assert_eq!(*app.auth.verified.lock().unwrap(), vec!["+989121234567".to_string()]);
}

#[tokio::test]
async fn test_repeated_login_creates_one_user() {
    let app = TestApp::new();
    let body = json!({ "mobileNumber": "9121234567", "otp": VALID_OTP });

    let (first, _) = app
        .json(Method::POST, "/api/v1/auth/login-by-mobile", body.clone())
        .await;
    let (second, _) = app
        .json(Method::POST, "/api/v1/auth/login-by-mobile", body)
        .await;

    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(app.users.count(), 1);
}

#[tokio::test]
async fn test_login_requires_otp() {
    let app = TestApp::new();

    let (response, body) = app
        .json(
            Method::POST,
            "/api/v1/auth/login-by-mobile",
            json!({ "mobileNumber": "9121234567" }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(app.auth.verified.lock().unwrap().is_empty());
}

#[test]
fn test_refresh_cookie_includes_domain_and_configured_age() {
    let mut config = AppConfig::default();
    config.server.domain = "example.com".to_string();
    config.server.refresh_cookie_max_age_secs = 60;

    assert_eq!(
        refresh_token_cookie("tok", &config),
        "refresh_token=tok; Max-Age=60; Path=/; Domain=example.com; Secure; HttpOnly; SameSite=Strict"
    );
}

#[test]
fn test_refresh_cookie_falls_back_to_seven_days() {
    let mut config = AppConfig::default();
    config.server.refresh_cookie_max_age_secs = 0;

    assert_eq!(
        refresh_token_cookie("tok", &config),
        "refresh_token=tok; Max-Age=604800; Path=/; Secure; HttpOnly; SameSite=Strict"
    );
}
