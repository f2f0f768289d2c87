use serde::{Deserialize, Serialize};
use validator::Validate;

// =============================================================================
// REGISTER
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub password: String,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
}

// =============================================================================
// LOGIN
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub access_token: String,
    pub refresh_token: String,
    pub user: PublicUser,
}

/// The public projection of an account returned to clients.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub username: String,
    pub profile: String,
}

// =============================================================================
// REFRESH
// =============================================================================

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub message: &'static str,
    pub access_token: String,
}

// =============================================================================
// AUTHENTICATE
// =============================================================================

#[derive(Debug, Serialize)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub profile: String,
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
        }
    }
}
