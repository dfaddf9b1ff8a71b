// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use chrono::Duration;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use tutorhub::config::Config;
use tutorhub::db::Database;
use tutorhub::models::{NewClientProfile, NewTutorProfile, NewUser, User};
use tutorhub::routes::create_router;
use tutorhub::time_utils::local_today;
use tutorhub::AppState;

/// Create a fresh, migrated in-memory database.
#[allow(dead_code)]
pub async fn test_db() -> Database {
    Database::in_memory()
        .await
        .expect("Failed to open in-memory database")
}

/// Create a test app backed by an in-memory database.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub async fn create_test_app() -> (Router, Arc<AppState>) {
    create_test_app_with_config(Config::test_default()).await
}

#[allow(dead_code)]
pub async fn create_test_app_with_config(config: Config) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(config, test_db().await));
    (create_router(state.clone()), state)
}

/// Create a test JWT token.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: i64, signing_key: &[u8]) -> String {
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use serde::Serialize;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[derive(Serialize)]
    struct Claims {
        sub: String,
        exp: usize,
        iat: usize,
    }

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        exp: now + 86400,
        iat: now,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )
    .unwrap()
}

fn new_user(name: &str) -> NewUser {
    NewUser {
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        name: name.to_string(),
        // Seeded accounts authenticate with tokens only
        password_hash: "!".to_string(),
    }
}

#[allow(dead_code)]
pub async fn seed_tutor(db: &Database, name: &str, city: &str, country: &str, subjects: &str) -> User {
    db.create_tutor(
        &new_user(name),
        &NewTutorProfile {
            subjects: subjects.to_string(),
            bio: None,
            experience: None,
            city: city.to_string(),
            country: country.to_string(),
        },
    )
    .await
    .expect("Failed to seed tutor")
}

#[allow(dead_code)]
pub async fn seed_client(db: &Database, name: &str, city: &str, country: &str) -> User {
    db.create_client(
        &new_user(name),
        &NewClientProfile {
            is_minor: false,
            parent_name: None,
            city: city.to_string(),
            country: country.to_string(),
        },
    )
    .await
    .expect("Failed to seed client")
}

/// Token for a seeded user.
#[allow(dead_code)]
pub fn token_for(state: &AppState, user: &User) -> String {
    create_test_jwt(user.id, &state.config.jwt_signing_key)
}

#[allow(dead_code)]
pub fn get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

#[allow(dead_code)]
pub fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Run one request; returns status, headers and the JSON body (`Null` if empty).
#[allow(dead_code)]
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, headers, body)
}

/// Local date `days` from today as `YYYY-MM-DD`.
#[allow(dead_code)]
pub fn date_in(days: i64) -> String {
    (local_today() + Duration::days(days))
        .format("%Y-%m-%d")
        .to_string()
}

/// Request a session as `client_token` and return its id.
#[allow(dead_code)]
pub async fn request_session(app: &Router, client_token: &str, tutor_id: i64) -> i64 {
    let (status, _, body) = send(
        app,
        post_json(
            &format!("/api/tutors/{}/sessions", tutor_id),
            Some(client_token),
            serde_json::json!({
                "subject": "Algebra",
                "scheduled_date": date_in(1),
                "scheduled_time": "15:00",
                "duration": 60,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "request failed: {body}");
    body["session"]["id"].as_i64().unwrap()
}
