use async_trait::async_trait;
use axum::{http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};

use super::model::{EmailVerification, NewUser, User};
use super::schema::ErrorResponse;

pub type Result<T> = std::result::Result<T, AuthError>;

// =============================================================================
// PERSISTENCE TRAITS
// =============================================================================

/// The persistence collaborator of the session manager. The manager never
/// deletes users; it only creates them and mutates the refresh-token columns.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn create(&self, user: &NewUser) -> Result<User>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    /// Unconditional overwrite: a new login replaces whatever session was
    /// live before (last login wins).
    async fn set_refresh_token(
        &self,
        user_id: i64,
        token_hash: &str,
        expiry: DateTime<Utc>,
    ) -> Result<()>;
    async fn clear_refresh_token(&self, user_id: i64) -> Result<()>;
}

/// Pending/completed email verifications, one row per email.
#[async_trait]
pub trait VerificationStore: Send + Sync {
    /// Replaces any existing row for the email with a fresh, unverified code.
    async fn upsert_code(&self, email: &str, code: &str) -> Result<()>;
    async fn find_by_email(&self, email: &str) -> Result<Option<EmailVerification>>;
    async fn mark_verified(&self, email: &str) -> Result<()>;
}

// =============================================================================
// ERROR TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("Email not verified")]
    EmailNotVerified,

    #[error("Email already used")]
    EmailAlreadyRegistered,

    #[error("Couldn't find user with email")]
    UnknownUser,

    #[error("Password not matched")]
    InvalidCredential,

    #[error("Invalid access token")]
    InvalidAccessToken,

    #[error("Invalid refresh token: {0}")]
    InvalidRefreshToken(String),

    #[error("No active session")]
    NoActiveSession,

    #[error("Refresh token not match")]
    RefreshTokenMismatch,

    #[error("Email not found")]
    VerificationNotFound,

    #[error("Code not matched")]
    CodeMismatch,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Hashing error: {0}")]
    Hashing(String),

    #[error("Token error: {0}")]
    Token(String),

    #[error("Mail delivery error: {0}")]
    Mail(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::EmailNotVerified => StatusCode::UNAUTHORIZED,
            Self::EmailAlreadyRegistered => StatusCode::CONFLICT,
            Self::UnknownUser => StatusCode::UNAUTHORIZED,
            Self::InvalidCredential => StatusCode::UNAUTHORIZED,
            Self::InvalidAccessToken => StatusCode::UNAUTHORIZED,
            Self::InvalidRefreshToken(_) => StatusCode::UNAUTHORIZED,
            Self::NoActiveSession => StatusCode::UNAUTHORIZED,
            Self::RefreshTokenMismatch => StatusCode::UNAUTHORIZED,
            Self::VerificationNotFound => StatusCode::CONFLICT,
            Self::CodeMismatch => StatusCode::UNAUTHORIZED,
            Self::Database(_)
            | Self::Hashing(_)
            | Self::Token(_)
            | Self::Mail(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Body shown to the caller. Token failures collapse to one message so a
    /// probe cannot tell which check rejected it; infrastructure faults never
    /// leak their detail.
    fn public_message(&self) -> String {
        match self {
            Self::InvalidRefreshToken(_) | Self::NoActiveSession | Self::RefreshTokenMismatch => {
                "Invalid refresh token".to_string()
            }
            Self::Database(_)
            | Self::Hashing(_)
            | Self::Token(_)
            | Self::Mail(_)
            | Self::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        match &self {
            AuthError::RefreshTokenMismatch => {
                // Possible token reuse or theft.
                tracing::warn!("security: refresh token did not match stored hash");
            }
            AuthError::InvalidRefreshToken(reason) => {
                tracing::warn!(%reason, "refresh token rejected");
            }
            AuthError::Database(e) => tracing::error!(error = %e, "database failure"),
            AuthError::Hashing(e) => tracing::error!(error = %e, "hashing failure"),
            AuthError::Token(e) => tracing::error!(error = %e, "token signer failure"),
            AuthError::Mail(e) => tracing::error!(error = %e, "mail delivery failure"),
            AuthError::Internal(e) => tracing::error!(error = %e, "internal failure"),
            _ => {}
        }

        (
            self.status_code(),
            Json(ErrorResponse::new(self.public_message())),
        )
            .into_response()
    }
}
