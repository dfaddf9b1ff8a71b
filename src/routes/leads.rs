// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Public tutor interest form.

use crate::error::Result;
use crate::middleware::JsonBody;
use crate::models::TutorLead;
use crate::services::leads::{self, LeadInput};
use crate::AppState;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/leads", post(submit_lead))
}

async fn submit_lead(
    State(state): State<Arc<AppState>>,
    JsonBody(input): JsonBody<LeadInput>,
) -> Result<(StatusCode, Json<TutorLead>)> {
    let lead = leads::submit_lead(&state.db, &input).await?;
    Ok((StatusCode::CREATED, Json(lead)))
}
