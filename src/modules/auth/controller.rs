use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use std::sync::Arc;
use validator::Validate;

use crate::modules::auth::{
    extract::{refresh_token_from, AuthUser},
    interface::AuthError,
    schema::{
        AuthenticatedUser, LoginRequest, LoginResponse, PublicUser, RefreshResponse,
        RegisterRequest, RegisterResponse,
    },
};
use crate::AppState;

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AuthError> {
    req.validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;

    let user = state
        .sessions
        .register(&req.email, &req.password, &req.username)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: format!("New account created with username : {}.", user.username),
        }),
    ))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, HeaderMap, Json<LoginResponse>), AuthError> {
    let user = state
        .sessions
        .validate_credentials(&req.email, &req.password)
        .await?;

    let access_token = state.sessions.issue_access_token(&user)?;
    let refresh_token = state.sessions.issue_refresh_token(&user)?;

    // Overwrites any prior session for this account: last login wins.
    state
        .sessions
        .persist_refresh_token(&refresh_token, user.id)
        .await?;

    let jar = jar
        .add(http_only_cookie("access_token", &access_token))
        .add(http_only_cookie("refresh_token", &refresh_token));

    // Both tokens ride one Authorization header, comma-joined; the guard and
    // the refresh endpoint pick their element back out.
    let headers = bearer_header(&format!("{},{}", access_token, refresh_token))?;

    Ok((
        jar,
        headers,
        Json(LoginResponse {
            message: "logged in successfully.",
            access_token,
            refresh_token,
            user: PublicUser {
                username: user.username,
                profile: user.profile,
            },
        }),
    ))
}

pub async fn refresh(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<(CookieJar, HeaderMap, Json<RefreshResponse>), AuthError> {
    let refresh_token = refresh_token_from(&headers)
        .ok_or_else(|| AuthError::InvalidRefreshToken("missing refresh token".to_string()))?;

    let access_token = state.sessions.refresh_access_token(&refresh_token).await?;

    let jar = jar.add(http_only_cookie("access_token", &access_token));
    let headers = bearer_header(&access_token)?;

    Ok((
        jar,
        headers,
        Json(RefreshResponse {
            message: "refreshed successfully",
            access_token,
        }),
    ))
}

pub async fn authenticate(AuthUser(claims): AuthUser) -> Json<AuthenticatedUser> {
    tracing::debug!(user_id = claims.id, "authenticated request");
    Json(AuthenticatedUser {
        id: claims.id,
        username: claims.username,
        email: claims.email,
        profile: claims.profile,
    })
}

fn http_only_cookie(name: &'static str, value: &str) -> Cookie<'static> {
    Cookie::build((name, value.to_string()))
        .http_only(true)
        .path("/")
        .build()
}

fn bearer_header(tokens: &str) -> Result<HeaderMap, AuthError> {
    let mut headers = HeaderMap::new();
    let value = HeaderValue::from_str(&format!("Bearer {}", tokens))
        .map_err(|e| AuthError::Internal(e.to_string()))?;
    headers.insert(header::AUTHORIZATION, value);
    Ok(headers)
}
