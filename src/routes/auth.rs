// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Registration, login and logout routes.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use axum_extra::extract::cookie::CookieJar;
use chrono::{Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, expired_session_cookie, session_cookie, SESSION_DAYS};
use crate::middleware::JsonBody;
use crate::models::User;
use crate::services::accounts::{
    self, LoginInput, RegisterClientInput, RegisterTutorInput,
};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register/tutor", post(register_tutor))
        .route("/auth/register/client", post(register_client))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

/// Session issued after registration or login.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
    pub expires_at: String,
    pub notice: String,
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub notice: String,
}

/// Issue a token for `user` and attach the session cookie.
fn start_session(
    state: &AppState,
    jar: CookieJar,
    user: User,
    notice: String,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    let token = create_jwt(user.id, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;
    let expires_at = format_utc_rfc3339(Utc::now() + Duration::days(SESSION_DAYS));

    let jar = jar.add(session_cookie(
        token.clone(),
        state.config.secure_cookies(),
    ));

    Ok((
        jar,
        Json(AuthResponse {
            user,
            token,
            expires_at,
            notice,
        }),
    ))
}

async fn register_tutor(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    JsonBody(input): JsonBody<RegisterTutorInput>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>)> {
    let user = accounts::register_tutor(&state.db, &input).await?;
    let (jar, body) = start_session(
        &state,
        jar,
        user,
        "Welcome! Your tutor account has been created.".to_string(),
    )?;
    Ok((StatusCode::CREATED, jar, body))
}

async fn register_client(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    JsonBody(input): JsonBody<RegisterClientInput>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>)> {
    let user = accounts::register_client(&state.db, &input).await?;
    let (jar, body) = start_session(
        &state,
        jar,
        user,
        "Welcome! Your account has been created.".to_string(),
    )?;
    Ok((StatusCode::CREATED, jar, body))
}

async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    JsonBody(input): JsonBody<LoginInput>,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    let user = accounts::authenticate(&state.db, &input).await?;
    let notice = format!("Welcome back, {}!", user.name);
    start_session(&state, jar, user, notice)
}

/// Logout - clears the session cookie. Bearer tokens expire on their own.
async fn logout(jar: CookieJar) -> (CookieJar, Json<LogoutResponse>) {
    (
        jar.remove(expired_session_cookie()),
        Json(LogoutResponse {
            notice: "You have been logged out.".to_string(),
        }),
    )
}
