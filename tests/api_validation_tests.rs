// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API input validation tests.

use axum::http::StatusCode;
use serde_json::{json, Value};

mod common;

use common::{post_json, send};

fn error_fields(body: &Value) -> Vec<String> {
    body["fields"]
        .as_array()
        .map(|fields| {
            fields
                .iter()
                .map(|f| f["field"].as_str().unwrap().to_string())
                .collect()
        })
        .unwrap_or_default()
}

fn client_body() -> Value {
    json!({
        "name": "Luis Vega",
        "email": "luis@example.com",
        "password1": "s3cret-pass",
        "password2": "s3cret-pass",
    })
}

#[tokio::test]
async fn test_password_mismatch_and_length() {
    let (app, state) = common::create_test_app().await;

    let mut body = client_body();
    body["password1"] = json!("short");
    body["password2"] = json!("shorter");

    let (status, _, body) = send(&app, post_json("/auth/register/client", None, body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");
    let fields = error_fields(&body);
    assert!(fields.contains(&"password1".to_string()));
    assert!(fields.contains(&"password2".to_string()));

    assert!(!state.db.email_exists("luis@example.com").await.unwrap());
}

#[tokio::test]
async fn test_minor_without_parent_name() {
    let (app, _) = common::create_test_app().await;

    let mut body = client_body();
    body["is_minor"] = json!(true);

    let (status, _, body) = send(&app, post_json("/auth/register/client", None, body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_fields(&body), vec!["parent_name".to_string()]);
}

#[tokio::test]
async fn test_minor_with_parent_name() {
    let (app, _) = common::create_test_app().await;

    let mut body = client_body();
    body["is_minor"] = json!(true);
    body["parent_name"] = json!("Rosa Vega");

    let (status, _, body) = send(&app, post_json("/auth/register/client", None, body)).await;
    assert_eq!(status, StatusCode::CREATED);

    let token = body["token"].as_str().unwrap();
    let (_, _, me) = send(&app, common::get("/api/me", token)).await;
    assert_eq!(me["profile"]["is_minor"], true);
    assert_eq!(me["profile"]["parent_name"], "Rosa Vega");
}

#[tokio::test]
async fn test_duplicate_email() {
    let (app, _) = common::create_test_app().await;

    let (status, _, _) = send(&app, post_json("/auth/register/client", None, client_body())).await;
    assert_eq!(status, StatusCode::CREATED);

    // Same address, different case, as a tutor this time
    let mut tutor = client_body();
    tutor["email"] = json!("LUIS@example.com");
    tutor["subjects"] = json!("Math");
    let (status, _, body) = send(&app, post_json("/auth/register/tutor", None, tutor)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_fields(&body), vec!["email".to_string()]);
}

#[tokio::test]
async fn test_tutor_requires_subjects() {
    let (app, _) = common::create_test_app().await;

    let mut tutor = client_body();
    tutor["subjects"] = json!("   ");
    let (status, _, body) = send(&app, post_json("/auth/register/tutor", None, tutor)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(error_fields(&body).contains(&"subjects".to_string()));
}

#[tokio::test]
async fn test_session_request_bad_time_and_subject() {
    let (app, state) = common::create_test_app().await;
    let tutor = common::seed_tutor(&state.db, "Ana Torres", "Quito", "Ecuador", "Math").await;
    let client = common::seed_client(&state.db, "Luis Vega", "Quito", "Ecuador").await;

    let (status, _, body) = send(
        &app,
        post_json(
            &format!("/api/tutors/{}/sessions", tutor.id),
            Some(&common::token_for(&state, &client)),
            json!({
                "subject": "x".repeat(201),
                "scheduled_date": common::date_in(2),
                "scheduled_time": "3pm",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields = error_fields(&body);
    assert!(fields.contains(&"subject".to_string()));
    assert!(fields.contains(&"scheduled_time".to_string()));
    assert!(!fields.contains(&"scheduled_date".to_string()));
}

#[tokio::test]
async fn test_missing_registration_fields_are_required() {
    let (app, _) = common::create_test_app().await;

    for field in ["name", "email", "password1", "password2"] {
        let mut body = client_body();
        body.as_object_mut().unwrap().remove(field);

        let (status, _, body) = send(&app, post_json("/auth/register/client", None, body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "omitting {field}");
        assert_eq!(body["error"], "validation_error");
        let missing: Vec<&Value> = body["fields"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|f| f["field"] == field)
            .collect();
        assert_eq!(missing.len(), 1, "omitting {field}");
        assert_eq!(missing[0]["message"], "This field is required.");
    }

    let mut tutor = client_body();
    tutor.as_object_mut().unwrap().remove("email");
    let (status, _, body) = send(&app, post_json("/auth/register/tutor", None, tutor)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields = error_fields(&body);
    assert!(fields.contains(&"email".to_string()));
    assert!(fields.contains(&"subjects".to_string()));
}

#[tokio::test]
async fn test_missing_session_request_fields_are_required() {
    let (app, state) = common::create_test_app().await;
    let tutor = common::seed_tutor(&state.db, "Ana Torres", "Quito", "Ecuador", "Math").await;
    let client = common::seed_client(&state.db, "Luis Vega", "Quito", "Ecuador").await;
    let token = common::token_for(&state, &client);

    let full = json!({
        "subject": "Algebra",
        "scheduled_date": common::date_in(2),
        "scheduled_time": "15:00",
    });
    for field in ["subject", "scheduled_date", "scheduled_time"] {
        let mut body = full.clone();
        body.as_object_mut().unwrap().remove(field);

        let (status, _, body) = send(
            &app,
            post_json(&format!("/api/tutors/{}/sessions", tutor.id), Some(&token), body),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "omitting {field}");
        assert_eq!(error_fields(&body), vec![field.to_string()]);
        assert_eq!(body["fields"][0]["message"], "This field is required.");
    }
}

#[tokio::test]
async fn test_missing_login_and_lead_fields() {
    let (app, _) = common::create_test_app().await;

    let (status, _, body) = send(&app, post_json("/auth/login", None, json!({}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        error_fields(&body),
        vec!["email".to_string(), "password".to_string()]
    );

    let (status, _, body) = send(
        &app,
        post_json("/leads", None, json!({ "name": "Marta Ruiz", "subject": "Art" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_fields(&body), vec!["email".to_string()]);
}

#[tokio::test]
async fn test_malformed_body_is_json_error() {
    let (app, _) = common::create_test_app().await;

    let mut body = client_body();
    body["is_minor"] = json!("sometimes");
    let (status, _, body) = send(&app, post_json("/auth/register/client", None, body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
    assert!(body["details"].as_str().is_some());
}

#[tokio::test]
async fn test_blank_location_rejected() {
    let (app, state) = common::create_test_app().await;

    let mut body = client_body();
    body["city"] = json!("   ");
    body["country"] = json!(" ");
    let (status, _, body) = send(&app, post_json("/auth/register/client", None, body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields = error_fields(&body);
    assert!(fields.contains(&"city".to_string()));
    assert!(fields.contains(&"country".to_string()));
    assert!(!state.db.email_exists("luis@example.com").await.unwrap());

    let mut tutor = client_body();
    tutor["email"] = json!("ana@example.com");
    tutor["subjects"] = json!("Math");
    tutor["city"] = json!(" ");
    let (status, _, body) = send(&app, post_json("/auth/register/tutor", None, tutor)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_fields(&body), vec!["city".to_string()]);
}
