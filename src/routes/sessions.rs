// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session lifecycle routes.

use crate::error::Result;
use crate::models::{ClassSession, Principal};
use crate::services::{ConfirmInput, MeetingRoom, SessionDetail};
use crate::time_utils::local_now;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/sessions/{id}", get(get_session))
        .route("/api/sessions/{id}/confirm", post(confirm_session))
        .route("/api/sessions/{id}/cancel", post(cancel_session))
        .route("/api/sessions/{id}/complete", post(complete_session))
        .route("/api/sessions/{id}/meeting", get(meeting_room))
}

/// Result of a session action, with the notice to show the user.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionActionResponse {
    pub notice: String,
    pub session: ClassSession,
}

async fn get_session(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<i64>,
) -> Result<Json<SessionDetail>> {
    Ok(Json(
        state
            .booking()
            .session_detail(&principal, id, local_now())
            .await?,
    ))
}

async fn confirm_session(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<i64>,
    input: Option<Json<ConfirmInput>>,
) -> Result<Json<SessionActionResponse>> {
    let input = input.map(|Json(i)| i).unwrap_or_default();
    let session = state
        .booking()
        .confirm_session(&principal, id, &input)
        .await?;

    Ok(Json(SessionActionResponse {
        notice: format!(
            "Session confirmed! The meeting link for {} has been generated.",
            session.meeting_platform.display_name()
        ),
        session,
    }))
}

async fn cancel_session(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<i64>,
) -> Result<Json<SessionActionResponse>> {
    let session = state.booking().cancel_session(&principal, id).await?;
    Ok(Json(SessionActionResponse {
        notice: "The session has been cancelled.".to_string(),
        session,
    }))
}

async fn complete_session(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<i64>,
) -> Result<Json<SessionActionResponse>> {
    let session = state.booking().complete_session(&principal, id).await?;
    Ok(Json(SessionActionResponse {
        notice: "The session has been marked as completed.".to_string(),
        session,
    }))
}

async fn meeting_room(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<i64>,
) -> Result<Json<MeetingRoom>> {
    Ok(Json(state.booking().open_meeting_room(&principal, id).await?))
}
