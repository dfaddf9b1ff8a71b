// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users: current user and dashboards.

use crate::error::{Destination, Result};
use crate::models::{Principal, Profile, User};
use crate::services::accounts::{self, ClientDashboard, TutorDashboard};
use crate::time_utils::local_today;
use crate::AppState;
use axum::{extract::State, response::Redirect, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/dashboard", get(dashboard))
        .route("/api/dashboard/tutor", get(tutor_dashboard))
        .route("/api/dashboard/client", get(client_dashboard))
}

// ─── User Profile ────────────────────────────────────────────

/// Current user response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserResponse {
    pub user: User,
    pub profile: Option<Profile>,
}

/// Get current user profile.
async fn get_me(principal: Principal) -> Json<UserResponse> {
    Json(UserResponse {
        user: principal.user,
        profile: principal.profile,
    })
}

// ─── Dashboards ──────────────────────────────────────────────

/// Send each user type to its own dashboard.
async fn dashboard(principal: Principal) -> Redirect {
    let target = if principal.is_tutor() {
        Destination::TutorDashboard
    } else {
        Destination::ClientDashboard
    };
    Redirect::to(target.path())
}

async fn tutor_dashboard(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<TutorDashboard>> {
    Ok(Json(
        accounts::tutor_dashboard(&state.db, &principal, local_today()).await?,
    ))
}

async fn client_dashboard(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<ClientDashboard>> {
    Ok(Json(
        accounts::client_dashboard(&state.db, &principal, local_today()).await?,
    ))
}
