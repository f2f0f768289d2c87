mod common;

use axum::http::{header, StatusCode};
use serde_json::{json, Value};

use common::{test_password, TestContext};

#[tokio::test]
async fn register_before_verification_is_rejected() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/auth/register")
        .json(&json!({
            "email": "alice@example.com",
            "password": test_password(),
            "username": "alice"
        }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"], "Email not verified");
}

#[tokio::test]
async fn register_with_invalid_email_is_bad_request() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/auth/register")
        .json(&json!({
            "email": "not-an-email",
            "password": test_password(),
            "username": "alice"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_twice_is_a_conflict() {
    let ctx = TestContext::new().await;
    ctx.register_user("alice@example.com", test_password(), "alice")
        .await;

    let response = ctx
        .server
        .post("/auth/register")
        .json(&json!({
            "email": "alice@example.com",
            "password": test_password(),
            "username": "alice2"
        }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["error"], "Email already used");
}

#[tokio::test]
async fn login_returns_tokens_and_public_user() {
    let ctx = TestContext::new().await;
    ctx.register_user("alice@example.com", test_password(), "alice")
        .await;

    let response = ctx
        .server
        .post("/auth/login")
        .json(&json!({
            "email": "alice@example.com",
            "password": test_password()
        }))
        .await;

    response.assert_status_ok();

    // Both tokens ride one Authorization header, comma-joined.
    let auth_header = response
        .headers()
        .get(header::AUTHORIZATION)
        .expect("no Authorization header")
        .to_str()
        .unwrap()
        .to_string();
    assert!(auth_header.starts_with("Bearer "));
    assert!(auth_header.contains(','));

    // httpOnly cookies for both carriers.
    let set_cookies: Vec<String> = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    assert!(set_cookies.iter().any(|c| c.starts_with("access_token=")));
    assert!(set_cookies.iter().any(|c| c.starts_with("refresh_token=")));
    assert!(set_cookies.iter().all(|c| c.contains("HttpOnly")));

    let body: Value = response.json();
    assert!(body.get("access_token").is_some());
    assert!(body.get("refresh_token").is_some());
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["profile"], "/ui/profile/default.png");
    assert!(body["user"].get("password").is_none());
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let ctx = TestContext::new().await;
    ctx.register_user("alice@example.com", test_password(), "alice")
        .await;

    let response = ctx
        .server
        .post("/auth/login")
        .json(&json!({
            "email": "alice@example.com",
            "password": "WrongPassword123!"
        }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_with_unknown_email_is_unauthorized() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/auth/login")
        .json(&json!({
            "email": "nobody@example.com",
            "password": test_password()
        }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_with_garbage_token_is_unauthorized_with_uniform_body() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/auth/refresh")
        .authorization_bearer("not.a.jwt")
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    // The body never says which check failed.
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid refresh token");
}

#[tokio::test]
async fn authenticate_without_token_is_unauthorized() {
    let ctx = TestContext::new().await;

    let response = ctx.server.get("/auth/authenticate").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn authenticate_with_tampered_token_is_unauthorized() {
    let ctx = TestContext::new().await;
    ctx.register_user("alice@example.com", test_password(), "alice")
        .await;

    let login: Value = ctx
        .server
        .post("/auth/login")
        .json(&json!({
            "email": "alice@example.com",
            "password": test_password()
        }))
        .await
        .json();

    let mut token = login["access_token"].as_str().unwrap().to_string();
    token.pop(); // break the signature

    let response = ctx
        .server
        .get("/auth/authenticate")
        .authorization_bearer(&token)
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

/// The full storefront onboarding path: verify, register, login, refresh,
/// authenticate.
#[tokio::test]
async fn full_session_lifecycle() {
    let ctx = TestContext::new().await;
    ctx.register_user("alice@example.com", test_password(), "alice")
        .await;

    let login_response = ctx
        .server
        .post("/auth/login")
        .json(&json!({
            "email": "alice@example.com",
            "password": test_password()
        }))
        .await;
    login_response.assert_status_ok();
    let login: Value = login_response.json();
    assert_eq!(login["user"]["username"], "alice");
    assert_eq!(login["user"]["profile"], "/ui/profile/default.png");

    let refresh_token = login["refresh_token"].as_str().unwrap();

    // The refresh token mints a new access token; it is not itself rotated,
    // so it works again afterwards.
    let refresh_response = ctx
        .server
        .post("/auth/refresh")
        .authorization_bearer(refresh_token)
        .await;
    refresh_response.assert_status_ok();
    let refreshed: Value = refresh_response.json();
    let new_access = refreshed["access_token"].as_str().unwrap().to_string();
    assert_eq!(refreshed["message"], "refreshed successfully");

    ctx.server
        .post("/auth/refresh")
        .authorization_bearer(refresh_token)
        .await
        .assert_status_ok();

    let auth_response = ctx
        .server
        .get("/auth/authenticate")
        .authorization_bearer(&new_access)
        .await;
    auth_response.assert_status_ok();
    let claims: Value = auth_response.json();
    assert_eq!(claims["email"], "alice@example.com");
    assert_eq!(claims["username"], "alice");
}

#[tokio::test]
async fn refresh_accepts_the_comma_joined_login_header() {
    let ctx = TestContext::new().await;
    ctx.register_user("alice@example.com", test_password(), "alice")
        .await;

    let login_response = ctx
        .server
        .post("/auth/login")
        .json(&json!({
            "email": "alice@example.com",
            "password": test_password()
        }))
        .await;

    // Replay the exact Authorization header the login handed out.
    let auth_header = login_response
        .headers()
        .get(header::AUTHORIZATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let tokens = auth_header.strip_prefix("Bearer ").unwrap();

    let response = ctx
        .server
        .post("/auth/refresh")
        .authorization_bearer(tokens)
        .await;
    response.assert_status_ok();
}
