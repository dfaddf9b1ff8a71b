// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use crate::validation::{FieldError, FieldErrors};
use axum::{
    extract::rejection::JsonRejection,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Where a soft failure sends the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Picks the dashboard matching the user type
    Dashboard,
    TutorDashboard,
    ClientDashboard,
}

impl Destination {
    pub fn path(self) -> &'static str {
        match self {
            Destination::Dashboard => "/api/dashboard",
            Destination::TutorDashboard => "/api/dashboard/tutor",
            Destination::ClientDashboard => "/api/dashboard/client",
        }
    }
}

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The caller may not perform this operation. Rendered as a redirect.
    #[error("Access denied: {notice}")]
    Denied {
        notice: String,
        redirect: Destination,
    },

    /// The operation does not apply in the current state. Nothing changed.
    #[error("State conflict: {notice}")]
    Conflict {
        notice: String,
        redirect: Destination,
    },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn denied(notice: impl Into<String>, redirect: Destination) -> Self {
        AppError::Denied {
            notice: notice.into(),
            redirect,
        }
    }

    pub fn conflict(notice: impl Into<String>, redirect: Destination) -> Self {
        AppError::Conflict {
            notice: notice.into(),
            redirect,
        }
    }

    /// Validation failure on a single field.
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.push(field, message);
        AppError::Validation(errors)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<FieldErrors> for AppError {
    fn from(errors: FieldErrors) -> Self {
        AppError::Validation(errors)
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    level: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<Vec<FieldError>>,
}

impl ErrorResponse {
    fn new(error: &str, details: Option<String>) -> Self {
        Self {
            error: error.to_string(),
            details,
            level: None,
            redirect: None,
            fields: None,
        }
    }
}

/// 303 to `redirect` with the notice in the body.
fn notice_response(error: &str, level: &'static str, notice: String, redirect: Destination) -> Response {
    let body = ErrorResponse {
        level: Some(level),
        redirect: Some(redirect.path()),
        ..ErrorResponse::new(error, Some(notice))
    };
    let mut response = (StatusCode::SEE_OTHER, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::LOCATION, HeaderValue::from_static(redirect.path()));
    response
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::new("unauthorized", None),
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::new("invalid_token", None),
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::new(
                    "invalid_credentials",
                    Some("Please enter a correct email and password.".to_string()),
                ),
            ),
            AppError::Denied { notice, redirect } => {
                tracing::warn!(notice = %notice, redirect = redirect.path(), "Access denied");
                return notice_response("forbidden", "error", notice, redirect);
            }
            AppError::Conflict { notice, redirect } => {
                tracing::info!(notice = %notice, redirect = redirect.path(), "State conflict");
                return notice_response("conflict", "warning", notice, redirect);
            }
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new("not_found", Some(msg)),
            ),
            AppError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse {
                    fields: Some(errors.iter().cloned().collect()),
                    ..ErrorResponse::new("validation_error", Some(errors.to_string()))
                },
            ),
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("bad_request", Some(msg)),
            ),
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("database_error", None),
                )
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("internal_error", None),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
