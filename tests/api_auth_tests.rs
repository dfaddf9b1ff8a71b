// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API authentication and CORS tests.
//!
//! These tests verify that:
//! 1. Protected routes reject requests without valid tokens
//! 2. Protected routes accept requests with valid tokens
//! 3. Registration and login issue working tokens
//! 4. CORS preflight requests return correct headers

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;

mod common;

use common::{get, post_json, send};

fn register_client_body(email: &str) -> serde_json::Value {
    json!({
        "name": "Luis Vega",
        "email": email,
        "password1": "s3cret-pass",
        "password2": "s3cret-pass",
        "city": "Cuenca",
    })
}

#[tokio::test]
async fn test_protected_route_without_token() {
    let (app, _) = common::create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_with_invalid_token() {
    let (app, _) = common::create_test_app().await;

    let (status, _, body) = send(&app, get("/api/me", "invalid-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_token");

    // Signed with a different key
    let forged = common::create_test_jwt(1, b"some_other_key_32_bytes_long!!!");
    let (status, _, _) = send(&app, get("/api/me", &forged)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_with_valid_token() {
    let (app, state) = common::create_test_app().await;
    let tutor = common::seed_tutor(&state.db, "Ana Torres", "Quito", "Ecuador", "Math").await;

    let (status, _, body) = send(&app, get("/api/me", &common::token_for(&state, &tutor))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], tutor.id);
    assert_eq!(body["user"]["user_type"], "tutor");
    assert_eq!(body["profile"]["kind"], "tutor");
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_token_for_unknown_or_inactive_user() {
    let (app, state) = common::create_test_app().await;

    let ghost = common::create_test_jwt(4242, &state.config.jwt_signing_key);
    let (status, _, _) = send(&app, get("/api/me", &ghost)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let client = common::seed_client(&state.db, "Luis Vega", "Quito", "Ecuador").await;
    state.db.set_user_active(client.id, false).await.unwrap();
    let (status, _, _) = send(&app, get("/api/me", &common::token_for(&state, &client))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_then_login() {
    let (app, _) = common::create_test_app().await;

    let (status, _, body) = send(
        &app,
        post_json("/auth/register/client", None, register_client_body("Luis@Example.com")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], "luis@example.com");
    let token = body["token"].as_str().unwrap().to_string();

    // Registration logs the user in
    let (status, _, me) = send(&app, get("/api/me", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["profile"]["city"], "Cuenca");
    assert_eq!(me["profile"]["country"], "Ecuador");

    let (status, _, body) = send(
        &app,
        post_json(
            "/auth/login",
            None,
            json!({ "email": "luis@example.com", "password": "s3cret-pass" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notice"], "Welcome back, Luis Vega!");
    assert!(body["expires_at"].as_str().unwrap().ends_with('Z'));

    let (status, _, body) = send(
        &app,
        post_json(
            "/auth/login",
            None,
            json!({ "email": "luis@example.com", "password": "wrong-pass" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_credentials");
}

#[tokio::test]
async fn test_register_tutor() {
    let (app, _) = common::create_test_app().await;

    let (status, _, body) = send(
        &app,
        post_json(
            "/auth/register/tutor",
            None,
            json!({
                "name": "Ana Torres",
                "email": "ana@example.com",
                "password1": "s3cret-pass",
                "password2": "s3cret-pass",
                "subjects": "Math, Physics",
                "bio": "  ",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["user_type"], "tutor");

    let token = body["token"].as_str().unwrap();
    let (_, _, me) = send(&app, get("/api/me", token)).await;
    assert_eq!(me["profile"]["subjects"], "Math, Physics");
    assert_eq!(me["profile"]["city"], "Quito");
    assert!(me["profile"]["bio"].is_null());
}

#[tokio::test]
async fn test_cors_preflight() {
    let (app, _) = common::create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/me")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
}

#[tokio::test]
async fn test_public_route_no_auth_required() {
    let (app, _) = common::create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("Cache-Control").unwrap(), "no-store");
}
