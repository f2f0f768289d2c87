//! Verification-code delivery. Production posts to an HTTP mail API; without
//! one configured, codes are written to the log so local flows still work.

use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use serde::Serialize;

use crate::config::MailConfig;
use crate::modules::auth::interface::{AuthError, Result};

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_verification_code(&self, to: &str, code: &str) -> Result<()>;
}

/// Generates a 6-digit numeric verification code.
pub fn generate_code() -> String {
    let n: u32 = rand::rng().random_range(100_000..=999_999);
    n.to_string()
}

#[derive(Serialize)]
struct MailApiRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: String,
}

pub struct HttpMailer {
    client: Client,
    config: MailConfig,
}

impl HttpMailer {
    pub fn new(client: Client, config: MailConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send_verification_code(&self, to: &str, code: &str) -> Result<()> {
        tracing::info!(%to, "sending verification code");

        let body = MailApiRequest {
            from: &self.config.from,
            to,
            subject: "[ODIN] Verify your email address",
            html: format!(
                "<p>Enter the number below to finish verifying your email.</p><h2>{}</h2>\
                 <p>If you don't know why you got this mail, just ignore it!</p>",
                code
            ),
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::Mail(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::Mail(format!(
                "mail API returned {}",
                response.status()
            )));
        }

        tracing::info!(%to, "verification code sent");
        Ok(())
    }
}

/// Development fallback: no outbound mail, code goes to the log.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_verification_code(&self, to: &str, code: &str) -> Result<()> {
        tracing::info!(%to, %code, "mail API not configured, logging verification code");
        Ok(())
    }
}
