//! Request-scoped capability check. Verifies the access token's signature and
//! attaches the decoded claims; it never consults the user directory, so a
//! deleted account keeps working until its token lapses.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use axum_extra::extract::cookie::CookieJar;

use crate::services::jwt::AccessClaims;
use crate::AppState;

use super::interface::AuthError;

/// Decoded access-token claims for the current request.
pub struct AuthUser(pub AccessClaims);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = access_token_from(&parts.headers).ok_or(AuthError::InvalidAccessToken)?;

        let decoded = state
            .sessions
            .jwt()
            .decode_access_token(&token)
            .map_err(|e| {
                tracing::warn!(error = %e, "access token rejected");
                AuthError::InvalidAccessToken
            })?;

        Ok(AuthUser(decoded.claims))
    }
}

/// Access token carrier: `Authorization: Bearer <access>[,<refresh>]` (the
/// login response sets both tokens comma-joined in one header), falling back
/// to the `access_token` cookie.
fn access_token_from(headers: &HeaderMap) -> Option<String> {
    if let Some(bearer) = bearer_value(headers) {
        return bearer.split(',').next().map(|t| t.trim().to_string());
    }

    CookieJar::from_headers(headers)
        .get("access_token")
        .map(|c| c.value().to_string())
}

/// Refresh token carrier: the `refresh_token` cookie, or the second
/// comma-separated bearer element when both tokens ride one header.
pub fn refresh_token_from(headers: &HeaderMap) -> Option<String> {
    if let Some(cookie) = CookieJar::from_headers(headers).get("refresh_token") {
        return Some(cookie.value().to_string());
    }

    let bearer = bearer_value(headers)?;
    let mut segments = bearer.split(',');
    let first = segments.next()?.trim();
    match segments.next() {
        Some(second) => Some(second.trim().to_string()),
        None => Some(first.to_string()),
    }
}

fn bearer_value(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
