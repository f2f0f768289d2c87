use axum::{extract::State, Json};
use std::sync::Arc;
use validator::Validate;

use crate::modules::auth::interface::AuthError;
use crate::services::mailer;
use crate::AppState;

use super::schema::{GetCodeRequest, GetCodeResponse, VerifyRequest, VerifyResponse};

/// Issues a verification code for an email that is not yet registered. Only
/// the newest code counts: re-requesting replaces the previous row and resets
/// the verified flag.
pub async fn get_code(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GetCodeRequest>,
) -> Result<Json<GetCodeResponse>, AuthError> {
    req.validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;

    if state
        .sessions
        .directory()
        .find_by_email(&req.email)
        .await?
        .is_some()
    {
        tracing::warn!(email = %req.email, "verification requested for taken email");
        return Err(AuthError::EmailAlreadyRegistered);
    }

    let code = mailer::generate_code();
    state.mailer.send_verification_code(&req.email, &code).await?;

    state
        .sessions
        .verifications()
        .upsert_code(&req.email, &code)
        .await?;
    tracing::info!(email = %req.email, "verification code set");

    Ok(Json(GetCodeResponse {
        message: "done",
        generated: true,
    }))
}

pub async fn verify(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>, AuthError> {
    req.validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;

    let row = state
        .sessions
        .verifications()
        .find_by_email(&req.email)
        .await?
        .ok_or_else(|| {
            tracing::warn!(email = %req.email, "verification attempted for unknown email");
            AuthError::VerificationNotFound
        })?;

    tracing::debug!(email = %req.email, "verify tried");

    if row.code != req.code {
        tracing::warn!(email = %req.email, "verification code mismatch");
        return Err(AuthError::CodeMismatch);
    }

    state
        .sessions
        .verifications()
        .mark_verified(&req.email)
        .await?;
    tracing::info!(email = %req.email, "email verified");

    Ok(Json(VerifyResponse { verified: true }))
}
