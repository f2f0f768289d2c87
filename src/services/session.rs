//! Session and credential management: password verification, token issuance,
//! refresh-token persistence and verification, revocation.
//!
//! Sessions are single-slot: each user row holds at most one refresh-token
//! hash, and every login overwrites it. Last login wins; the previous refresh
//! token stops working the moment a new one is persisted.

use std::sync::Arc;

use chrono::Utc;

use crate::modules::auth::interface::{AuthError, Result, UserDirectory, VerificationStore};
use crate::modules::auth::model::{NewUser, User, DEFAULT_PROFILE};
use crate::services::hashing;
use crate::services::jwt::JwtService;

pub struct SessionManager {
    directory: Arc<dyn UserDirectory>,
    verifications: Arc<dyn VerificationStore>,
    jwt: JwtService,
}

impl SessionManager {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        verifications: Arc<dyn VerificationStore>,
        jwt: JwtService,
    ) -> Self {
        Self {
            directory,
            verifications,
            jwt,
        }
    }

    pub fn verifications(&self) -> &Arc<dyn VerificationStore> {
        &self.verifications
    }

    pub fn directory(&self) -> &Arc<dyn UserDirectory> {
        &self.directory
    }

    /// Creates an account. Gated on a verified email row; the email must not
    /// already belong to a user. Username uniqueness is not enforced here.
    pub async fn register(&self, email: &str, password: &str, username: &str) -> Result<User> {
        let verification = self.verifications.find_by_email(email).await?;
        match verification {
            Some(v) if v.verified => {}
            _ => return Err(AuthError::EmailNotVerified),
        }

        if self.directory.find_by_email(email).await?.is_some() {
            return Err(AuthError::EmailAlreadyRegistered);
        }

        let password_hash = hash_off_thread(password.to_string()).await?;
        tracing::debug!(%email, "password hashed for new account");

        let user = self
            .directory
            .create(&NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
                profile: DEFAULT_PROFILE.to_string(),
            })
            .await?;

        tracing::info!(username = %user.username, "new account created");
        Ok(user)
    }

    /// Checks a password against the stored hash. The comparison is a
    /// recompute-and-verify over the full digest; timing does not reveal how
    /// much of the password matched.
    pub async fn validate_credentials(&self, email: &str, password: &str) -> Result<User> {
        let user = self
            .directory
            .find_by_email(email)
            .await?
            .ok_or(AuthError::UnknownUser)?;

        let matched =
            verify_off_thread(password.to_string(), user.password_hash.clone()).await?;
        if !matched {
            return Err(AuthError::InvalidCredential);
        }

        Ok(user)
    }

    /// Short-lived stateless token carrying the public user projection.
    /// Irrevocable once issued; it simply expires.
    pub fn issue_access_token(&self, user: &User) -> Result<String> {
        tracing::debug!(email = %user.email, "issuing access token");
        self.jwt
            .create_access_token(user.id, &user.username, &user.email, &user.profile)
            .map_err(|e| AuthError::Token(e.to_string()))
    }

    /// Long-lived token carrying only the user id, signed with the refresh
    /// secret.
    pub fn issue_refresh_token(&self, user: &User) -> Result<String> {
        self.jwt
            .create_refresh_token(user.id)
            .map_err(|e| AuthError::Token(e.to_string()))
    }

    /// Stores the one-way hash of a raw refresh token on the user row,
    /// overwriting any previous session.
    pub async fn persist_refresh_token(&self, raw_token: &str, user_id: i64) -> Result<()> {
        let token_hash = hash_off_thread(raw_token.to_string()).await?;
        let expiry = Utc::now() + self.jwt.refresh_ttl();

        self.directory
            .set_refresh_token(user_id, &token_hash, expiry)
            .await?;
        tracing::debug!(user_id, "refresh token persisted");
        Ok(())
    }

    /// Exchanges a valid refresh token for a new access token.
    ///
    /// The refresh token itself is not rotated; it stays valid until its own
    /// expiry or until the session is replaced or revoked.
    pub async fn refresh_access_token(&self, raw_token: &str) -> Result<String> {
        let decoded = self
            .jwt
            .verify_refresh_token(raw_token)
            .map_err(|e| AuthError::InvalidRefreshToken(e.to_string()))?;

        let user = self
            .directory
            .find_by_id(decoded.claims.id)
            .await?
            .ok_or(AuthError::UnknownUser)?;

        let stored_hash = user
            .refresh_token_hash
            .as_deref()
            .ok_or(AuthError::NoActiveSession)?;

        let matched =
            verify_off_thread(raw_token.to_string(), stored_hash.to_string()).await?;
        if !matched {
            return Err(AuthError::RefreshTokenMismatch);
        }

        tracing::info!(user_id = user.id, "access token refreshed");
        self.issue_access_token(&user)
    }

    /// Logs the user out by clearing the stored refresh-token hash.
    /// Revoking an already-revoked session is a no-op.
    pub async fn revoke_session(&self, user_id: i64) -> Result<()> {
        self.directory.clear_refresh_token(user_id).await?;
        tracing::info!(user_id, "refresh token removed");
        Ok(())
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }
}

// Argon2 is CPU-bound; run it on the blocking pool so a burst of logins
// cannot stall unrelated request handling.
async fn hash_off_thread(secret: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hashing::hash_secret(&secret))
        .await
        .map_err(|e| AuthError::Internal(e.to_string()))?
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

async fn verify_off_thread(secret: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || hashing::verify_secret(&secret, &hash))
        .await
        .map_err(|e| AuthError::Internal(e.to_string()))?
        .map_err(|e| AuthError::Hashing(e.to_string()))
}
