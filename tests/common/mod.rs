use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum_test::TestServer;
use serde_json::json;
use tokio::sync::Mutex;

use odin_backend::config::AuthConfig;
use odin_backend::modules::auth::interface::Result as AuthResult;
use odin_backend::modules::auth::memory::{MemoryUserDirectory, MemoryVerificationStore};
use odin_backend::services::jwt::JwtService;
use odin_backend::services::mailer::Mailer;
use odin_backend::services::session::SessionManager;
use odin_backend::AppState;

/// Captures outbound verification codes instead of sending mail, so tests
/// can complete the verify flow.
#[derive(Default)]
pub struct RecordingMailer {
    codes: Mutex<HashMap<String, String>>,
}

#[allow(dead_code)]
impl RecordingMailer {
    pub async fn last_code_for(&self, email: &str) -> Option<String> {
        self.codes.lock().await.get(email).cloned()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_verification_code(&self, to: &str, code: &str) -> AuthResult<()> {
        self.codes
            .lock()
            .await
            .insert(to.to_string(), code.to_string());
        Ok(())
    }
}

#[allow(dead_code)]
pub struct TestContext {
    pub server: TestServer,
    pub mailer: Arc<RecordingMailer>,
}

#[allow(dead_code)]
impl TestContext {
    pub async fn new() -> Self {
        let mailer = Arc::new(RecordingMailer::default());

        let sessions = SessionManager::new(
            Arc::new(MemoryUserDirectory::new()),
            Arc::new(MemoryVerificationStore::new()),
            JwtService::new(test_auth_config()),
        );

        let app = odin_backend::create_app(AppState {
            sessions,
            mailer: mailer.clone(),
        })
        .await;

        let server = TestServer::new(app).expect("Failed to create test server");

        Self { server, mailer }
    }

    /// Runs the full get-code/verify flow for an email.
    pub async fn verify_email(&self, email: &str) {
        self.server
            .post("/mail/get-code")
            .json(&json!({ "email": email }))
            .await
            .assert_status_ok();

        let code = self
            .mailer
            .last_code_for(email)
            .await
            .expect("no verification code recorded");

        self.server
            .post("/mail/verify")
            .json(&json!({ "email": email, "code": code }))
            .await
            .assert_status_ok();
    }

    /// Verifies the email and registers an account for it.
    pub async fn register_user(&self, email: &str, password: &str, username: &str) {
        self.verify_email(email).await;

        self.server
            .post("/auth/register")
            .json(&json!({
                "email": email,
                "password": password,
                "username": username
            }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
    }
}

pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        access_secret: "access-secret-for-tests".to_string(),
        access_ttl_secs: 900,
        refresh_secret: "refresh-secret-for-tests".to_string(),
        refresh_ttl_secs: 604_800,
    }
}

#[allow(dead_code)]
pub fn test_password() -> &'static str {
    "TestPassword123!"
}
