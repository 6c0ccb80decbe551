mod common;

use axum::http::StatusCode;
use common::{body_json, TestApp};
use serde_json::json;
use tower::ServiceExt;

fn create_payload(slug: &str) -> serde_json::Value {
    json!({
        "user_id": format!("user-{}", slug),
        "slug": slug,
        "name": "Dr. New",
        "email": "new@example.com",
        "timezone": "Europe/Vienna"
    })
}

#[tokio::test]
async fn test_admin_creates_therapist_with_defaults() {
    let app = TestApp::new().await;
    let token = app.admin_token();

    let res = app.post_json("/api/v1/therapists", create_payload("dr-new"), Some(&token)).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = body_json(res).await;
    assert_eq!(body["default_session_duration_min"], 50);
    assert_eq!(body["buffer_min"], 10);
    assert_eq!(body["advance_booking_days"], 30);
    assert_eq!(body["min_booking_notice_hours"], 24);
    assert_eq!(body["is_active"], true);

    // Now publicly visible.
    let res = app.get("/api/v1/therapists/dr-new").await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_non_admin_cannot_create_therapist() {
    let app = TestApp::new().await;
    let token = app.token_for("user-x", "therapist");

    let res = app.post_json("/api/v1/therapists", create_payload("dr-x"), Some(&token)).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_duplicate_slug_is_a_conflict() {
    let app = TestApp::new().await;
    let token = app.admin_token();

    let first = app.post_json("/api/v1/therapists", create_payload("dr-dup"), Some(&token)).await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let second = app.post_json("/api/v1/therapists", create_payload("dr-dup"), Some(&token)).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_invalid_timezone_is_rejected() {
    let app = TestApp::new().await;
    let token = app.admin_token();

    let mut payload = create_payload("dr-tz");
    payload["timezone"] = json!("Middle/Nowhere");
    let res = app.post_json("/api/v1/therapists", payload, Some(&token)).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_archive_hides_therapist_from_public() {
    let app = TestApp::new().await;
    let therapist = app.seed_therapist("dr-gone", "UTC").await;
    let token = app.admin_token();

    let res = app
        .router
        .clone()
        .oneshot(
            axum::http::Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/therapists/{}/profile", therapist.id))
                .header("Authorization", format!("Bearer {}", token))
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    // Slug lookups, listings and availability all treat it as gone.
    let res = app.get("/api/v1/therapists/dr-gone").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app.get("/api/v1/therapists").await;
    let list = body_json(res).await;
    assert!(list.as_array().unwrap().is_empty());

    let res = app.get("/api/v1/therapists/dr-gone/dates").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_owner_updates_own_settings() {
    let app = TestApp::new().await;
    let therapist = app.seed_therapist("dr-own", "UTC").await;
    let owner = app.token_for("user-dr-own", "therapist");

    let res = app
        .router
        .clone()
        .oneshot(
            axum::http::Request::builder()
                .method("PUT")
                .uri(format!("/api/v1/therapists/{}/profile", therapist.id))
                .header("Authorization", format!("Bearer {}", owner))
                .header("Content-Type", "application/json")
                .body(axum::body::Body::from(
                    json!({"buffer_min": 15, "min_booking_notice_hours": 48}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body["buffer_min"], 15);
    assert_eq!(body["min_booking_notice_hours"], 48);
}

#[tokio::test]
async fn test_session_type_crud_and_public_listing() {
    let app = TestApp::new().await;
    let therapist = app.seed_therapist("dr-st", "UTC").await;
    let owner = app.token_for("user-dr-st", "therapist");

    let res = app
        .post_json(
            &format!("/api/v1/therapists/{}/session-types", therapist.id),
            json!({"name": "Initial consultation", "duration_min": 80, "meeting_type": "video"}),
            Some(&owner),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created = body_json(res).await;

    let res = app.get("/api/v1/therapists/dr-st/session-types").await;
    let listed = body_json(res).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    // Soft delete removes it from the public list.
    let res = app
        .router
        .clone()
        .oneshot(
            axum::http::Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/session-types/{}", created["id"].as_str().unwrap()))
                .header("Authorization", format!("Bearer {}", owner))
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = app.get("/api/v1/therapists/dr-st/session-types").await;
    let listed = body_json(res).await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_meeting_type_rejected() {
    let app = TestApp::new().await;
    let therapist = app.seed_therapist("dr-st", "UTC").await;
    let token = app.admin_token();

    let res = app
        .post_json(
            &format!("/api/v1/therapists/{}/session-types", therapist.id),
            json!({"name": "Seance", "duration_min": 60, "meeting_type": "telepathy"}),
            Some(&token),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
