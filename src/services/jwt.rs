use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;

/// Access-token payload: the public projection of a user. Stateless; validity
/// is signature + embedded expiry, nothing server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub profile: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

/// Refresh-token payload. Minimal claim surface: these live longer than
/// access tokens, so they carry the user id and nothing else.
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub id: i64,
    pub exp: i64,
    pub iat: i64,
    /// Unique per issuance, so two tokens minted in the same second still
    /// differ.
    pub jti: String,
}

pub struct JwtService {
    access_secret: String,
    refresh_secret: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtService {
    pub fn new(config: AuthConfig) -> Self {
        Self {
            access_secret: config.access_secret,
            refresh_secret: config.refresh_secret,
            access_ttl: Duration::seconds(config.access_ttl_secs),
            refresh_ttl: Duration::seconds(config.refresh_ttl_secs),
        }
    }

    pub fn create_access_token(
        &self,
        id: i64,
        username: &str,
        email: &str,
        profile: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = AccessClaims {
            id,
            username: username.to_string(),
            email: email.to_string(),
            profile: profile.to_string(),
            exp: (now + self.access_ttl).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.access_secret.as_bytes()),
        )
    }

    pub fn create_refresh_token(&self, id: i64) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = RefreshClaims {
            id,
            exp: (now + self.refresh_ttl).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.refresh_secret.as_bytes()),
        )
    }

    /// Signature-only check for the request guard. Expiry is deliberately not
    /// enforced here; the original service behaves this way and the policy is
    /// kept as-is pending product sign-off (see DESIGN.md).
    pub fn decode_access_token(
        &self,
        token: &str,
    ) -> Result<TokenData<AccessClaims>, jsonwebtoken::errors::Error> {
        let mut validation = Validation::default();
        validation.validate_exp = false;
        decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(self.access_secret.as_bytes()),
            &validation,
        )
    }

    /// Full verification: signature and embedded expiry, against the refresh
    /// secret.
    pub fn verify_refresh_token(
        &self,
        token: &str,
    ) -> Result<TokenData<RefreshClaims>, jsonwebtoken::errors::Error> {
        decode::<RefreshClaims>(
            token,
            &DecodingKey::from_secret(self.refresh_secret.as_bytes()),
            &Validation::default(),
        )
    }

    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl.num_seconds()
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }
}
