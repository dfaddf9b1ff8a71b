// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tutor discovery and session requests.

use crate::error::Result;
use crate::middleware::JsonBody;
use crate::models::{Principal, TutorListing};
use crate::routes::sessions::SessionActionResponse;
use crate::services::ranking::{self, TutorFilter, TutorSearchResult};
use crate::services::SessionRequestInput;
use crate::time_utils::local_today;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/tutors", get(list_tutors))
        .route("/api/tutors/{id}", get(get_tutor))
        .route("/api/tutors/{id}/sessions", post(request_session))
}

/// Active tutors ranked by proximity to the client.
async fn list_tutors(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Query(filter): Query<TutorFilter>,
) -> Result<Json<TutorSearchResult>> {
    Ok(Json(
        ranking::find_tutors(&state.db, &principal, &filter).await?,
    ))
}

async fn get_tutor(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<i64>,
) -> Result<Json<TutorListing>> {
    Ok(Json(ranking::tutor_detail(&state.db, &principal, id).await?))
}

async fn request_session(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(tutor_id): Path<i64>,
    JsonBody(input): JsonBody<SessionRequestInput>,
) -> Result<(StatusCode, Json<SessionActionResponse>)> {
    let session = state
        .booking()
        .request_session(&principal, tutor_id, &input, local_today())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SessionActionResponse {
            notice: format!(
                "Request sent! {} will review your request soon.",
                session.tutor_name
            ),
            session,
        }),
    ))
}
