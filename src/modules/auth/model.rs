use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// Default avatar assigned at registration.
pub const DEFAULT_PROFILE: &str = "/ui/profile/default.png";

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub profile: String,
    pub birthdate: Option<NaiveDate>,
    /// One-way hash of the single live refresh token, absent when logged out.
    pub refresh_token_hash: Option<String>,
    pub refresh_token_expiry: Option<DateTime<Utc>>,
}

/// Insert payload for a new account. The directory assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub profile: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct EmailVerification {
    pub id: i64,
    pub email: String,
    pub code: String,
    pub verified: bool,
}
