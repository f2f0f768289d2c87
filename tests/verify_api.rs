mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

use common::{test_password, TestContext};

#[tokio::test]
async fn get_code_records_a_six_digit_code() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/mail/get-code")
        .json(&json!({ "email": "alice@example.com" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["generated"], true);

    let code = ctx.mailer.last_code_for("alice@example.com").await.unwrap();
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_digit()));
}

#[tokio::test]
async fn get_code_for_registered_email_is_a_conflict() {
    let ctx = TestContext::new().await;
    ctx.register_user("alice@example.com", test_password(), "alice")
        .await;

    let response = ctx
        .server
        .post("/mail/get-code")
        .json(&json!({ "email": "alice@example.com" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn verify_with_wrong_code_is_unauthorized() {
    let ctx = TestContext::new().await;

    ctx.server
        .post("/mail/get-code")
        .json(&json!({ "email": "alice@example.com" }))
        .await
        .assert_status_ok();

    let real = ctx.mailer.last_code_for("alice@example.com").await.unwrap();
    let wrong = if real == "000000" { "000001" } else { "000000" };

    let response = ctx
        .server
        .post("/mail/verify")
        .json(&json!({ "email": "alice@example.com", "code": wrong }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"], "Code not matched");
}

#[tokio::test]
async fn verify_without_a_pending_code_is_a_conflict() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/mail/verify")
        .json(&json!({ "email": "nobody@example.com", "code": "123456" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn requesting_a_new_code_resets_verification() {
    let ctx = TestContext::new().await;
    ctx.verify_email("alice@example.com").await;

    // A fresh code replaces the verified row; registration is gated again
    // until the new code is confirmed.
    ctx.server
        .post("/mail/get-code")
        .json(&json!({ "email": "alice@example.com" }))
        .await
        .assert_status_ok();

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
}
