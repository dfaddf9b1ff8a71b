// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Registration, login and dashboards.

use crate::db::{Database, Party, SessionQuery};
use crate::error::{AppError, Destination, Result};
use crate::models::{
    ClassSession, ClientProfile, NewClientProfile, NewTutorProfile, NewUser, Principal, Profile,
    SessionStatus, TutorProfile, User, DEFAULT_CITY, DEFAULT_COUNTRY,
};
use crate::services::password;
use crate::validation::FieldErrors;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const UPCOMING_LIMIT: u32 = 5;
const PAST_LIMIT: u32 = 5;

fn default_city() -> String {
    DEFAULT_CITY.to_string()
}

fn default_country() -> String {
    DEFAULT_COUNTRY.to_string()
}

fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterTutorInput {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "Enter your full name (at most 200 characters)."))]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[serde(default)]
    #[validate(length(
        min = 8,
        message = "This password is too short. It must contain at least 8 characters."
    ))]
    pub password1: String,
    #[serde(default)]
    #[validate(must_match(other = "password1", message = "The two password fields didn't match."))]
    pub password2: String,
    /// Free text, e.g. "Math, Physics"
    #[serde(default)]
    #[validate(length(min = 1, max = 500, message = "List the subjects you teach (at most 500 characters)."))]
    pub subjects: String,
    #[serde(default = "default_city")]
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[serde(default = "default_country")]
    #[validate(length(min = 1, max = 100))]
    pub country: String,
    pub bio: Option<String>,
    pub experience: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterClientInput {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "Enter your full name (at most 200 characters)."))]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[serde(default)]
    #[validate(length(
        min = 8,
        message = "This password is too short. It must contain at least 8 characters."
    ))]
    pub password1: String,
    #[serde(default)]
    #[validate(must_match(other = "password1", message = "The two password fields didn't match."))]
    pub password2: String,
    #[serde(default = "default_city")]
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[serde(default = "default_country")]
    #[validate(length(min = 1, max = 100))]
    pub country: String,
    #[serde(default)]
    pub is_minor: bool,
    /// Required when `is_minor` is set
    #[validate(length(max = 200))]
    pub parent_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Account fields shared by both registration forms.
struct AccountFields<'a> {
    name: &'a str,
    email: &'a str,
    password1: &'a str,
    password2: &'a str,
    city: &'a str,
    country: &'a str,
}

/// Checks shared by both registration forms, beyond the derived ones.
///
/// Values are judged after trimming, so whitespace-only input counts as
/// missing.
async fn check_account(
    db: &Database,
    errors: &mut FieldErrors,
    fields: &AccountFields<'_>,
) -> Result<()> {
    errors.require("name", fields.name);
    errors.require("email", fields.email);
    errors.require("password1", fields.password1);
    errors.require("password2", fields.password2);
    errors.require("city", fields.city);
    errors.require("country", fields.country);
    if !errors.has("email") && db.email_exists(fields.email.trim()).await? {
        errors.push("email", "A user with that email already exists.");
    }
    Ok(())
}

fn new_user(name: &str, email: &str, password: &str) -> Result<NewUser> {
    Ok(NewUser {
        email: email.trim().to_lowercase(),
        name: name.trim().to_string(),
        password_hash: password::hash_password(password)?,
    })
}

/// Create a tutor account with its profile.
pub async fn register_tutor(db: &Database, input: &RegisterTutorInput) -> Result<User> {
    let mut errors = FieldErrors::from_validator(input.validate());
    check_account(
        db,
        &mut errors,
        &AccountFields {
            name: &input.name,
            email: &input.email,
            password1: &input.password1,
            password2: &input.password2,
            city: &input.city,
            country: &input.country,
        },
    )
    .await?;
    errors.require("subjects", &input.subjects);
    errors.into_result(())?;

    let user = db
        .create_tutor(
            &new_user(&input.name, &input.email, &input.password1)?,
            &NewTutorProfile {
                subjects: input.subjects.trim().to_string(),
                bio: optional_text(input.bio.as_deref()),
                experience: optional_text(input.experience.as_deref()),
                city: input.city.trim().to_string(),
                country: input.country.trim().to_string(),
            },
        )
        .await?;

    tracing::info!(user_id = user.id, "Tutor registered");
    Ok(user)
}

/// Create a client account with its profile.
pub async fn register_client(db: &Database, input: &RegisterClientInput) -> Result<User> {
    let mut errors = FieldErrors::from_validator(input.validate());
    check_account(
        db,
        &mut errors,
        &AccountFields {
            name: &input.name,
            email: &input.email,
            password1: &input.password1,
            password2: &input.password2,
            city: &input.city,
            country: &input.country,
        },
    )
    .await?;
    let parent_name = optional_text(input.parent_name.as_deref());
    if input.is_minor && parent_name.is_none() {
        errors.push(
            "parent_name",
            "A parent or legal guardian name is required for minors.",
        );
    }
    errors.into_result(())?;

    let user = db
        .create_client(
            &new_user(&input.name, &input.email, &input.password1)?,
            &NewClientProfile {
                is_minor: input.is_minor,
                parent_name,
                city: input.city.trim().to_string(),
                country: input.country.trim().to_string(),
            },
        )
        .await?;

    tracing::info!(user_id = user.id, is_minor = input.is_minor, "Client registered");
    Ok(user)
}

/// Check login credentials. Unknown email, wrong password and inactive
/// accounts are indistinguishable to the caller.
pub async fn authenticate(db: &Database, input: &LoginInput) -> Result<User> {
    let mut errors = FieldErrors::new();
    errors.require("email", &input.email);
    errors.require("password", &input.password);
    errors.into_result(())?;

    let user = db.get_user_by_email(input.email.trim()).await?;

    match user {
        Some(user) if user.is_active && password::verify_password(&input.password, &user.password_hash) => {
            tracing::info!(user_id = user.id, "Login succeeded");
            Ok(user)
        }
        Some(user) => {
            tracing::warn!(user_id = user.id, "Login failed");
            Err(AppError::InvalidCredentials)
        }
        None => {
            tracing::warn!("Login failed for unknown email");
            Err(AppError::InvalidCredentials)
        }
    }
}

/// Tutor home page context.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TutorDashboard {
    pub profile: Option<TutorProfile>,
    pub pending_sessions: Vec<ClassSession>,
    /// Next confirmed sessions from today on
    pub upcoming_sessions: Vec<ClassSession>,
    pub all_active_sessions: Vec<ClassSession>,
    pub pending_count: usize,
}

/// Client home page context.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ClientDashboard {
    pub profile: Option<ClientProfile>,
    pub upcoming_sessions: Vec<ClassSession>,
    pub pending_sessions: Vec<ClassSession>,
    /// Most recent completed or cancelled sessions
    pub past_sessions: Vec<ClassSession>,
}

pub async fn tutor_dashboard(
    db: &Database,
    principal: &Principal,
    today: NaiveDate,
) -> Result<TutorDashboard> {
    if !principal.is_tutor() {
        return Err(AppError::denied(
            "Access denied. This section is for tutors only.",
            Destination::ClientDashboard,
        ));
    }

    let party = Party::Tutor(principal.id());
    let pending_sessions = db
        .list_sessions(&SessionQuery::new(party, &[SessionStatus::Pending]))
        .await?;
    let upcoming_sessions = db
        .list_sessions(
            &SessionQuery::new(party, &[SessionStatus::Confirmed])
                .from_date(today)
                .limit(UPCOMING_LIMIT),
        )
        .await?;
    let all_active_sessions = db
        .list_sessions(&SessionQuery::new(
            party,
            &[SessionStatus::Pending, SessionStatus::Confirmed],
        ))
        .await?;

    let profile = match &principal.profile {
        Some(Profile::Tutor(p)) => Some(p.clone()),
        _ => None,
    };

    Ok(TutorDashboard {
        profile,
        pending_count: pending_sessions.len(),
        pending_sessions,
        upcoming_sessions,
        all_active_sessions,
    })
}

pub async fn client_dashboard(
    db: &Database,
    principal: &Principal,
    today: NaiveDate,
) -> Result<ClientDashboard> {
    if !principal.is_client() {
        return Err(AppError::denied(
            "Access denied. This section is for students only.",
            Destination::TutorDashboard,
        ));
    }

    let party = Party::Client(principal.id());
    let viewer = |sessions: Vec<ClassSession>| -> Vec<ClassSession> {
        sessions
            .into_iter()
            .map(|s| s.for_viewer(principal.id()))
            .collect()
    };

    let upcoming_sessions = db
        .list_sessions(&SessionQuery::new(party, &[SessionStatus::Confirmed]).from_date(today))
        .await?;
    let pending_sessions = db
        .list_sessions(&SessionQuery::new(party, &[SessionStatus::Pending]))
        .await?;
    let closed = SessionStatus::closed();
    let past_sessions = db
        .list_sessions(
            &SessionQuery::new(party, &closed)
                .newest_first()
                .limit(PAST_LIMIT),
        )
        .await?;

    let profile = match &principal.profile {
        Some(Profile::Client(p)) => Some(p.clone()),
        _ => None,
    };

    Ok(ClientDashboard {
        profile,
        upcoming_sessions: viewer(upcoming_sessions),
        pending_sessions: viewer(pending_sessions),
        past_sessions: viewer(past_sessions),
    })
}
