mod common;

use axum::http::StatusCode;
use chrono::{TimeZone, Utc, Weekday};
use common::{body_json, upcoming, TestApp};
use serde_json::json;

async fn book_slot(app: &TestApp, hour: u32) -> (String, String) {
    let date = upcoming(Weekday::Wed);
    let start = Utc.from_utc_datetime(&date.and_hms_opt(hour, 0, 0).unwrap());
    let res = app
        .post_json(
            "/api/v1/therapists/dr-smith/book",
            json!({"start": start.to_rfc3339(), "client_name": "Ana", "client_email": "ana@example.com"}),
            None,
        )
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = body_json(res).await;
    (
        body["id"].as_str().unwrap().to_string(),
        body["management_token"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn test_lookup_by_management_token() {
    let app = TestApp::new().await;
    app.seed_therapist("dr-smith", "UTC").await;
    let (id, token) = book_slot(&app, 10).await;

    let res = app.get(&format!("/api/v1/bookings/manage/{}", token)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body["id"], id.as_str());

    let res = app.get("/api/v1/bookings/manage/bogus-token").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_client_cancel_requires_reason_and_frees_slot() {
    let app = TestApp::new().await;
    app.seed_therapist("dr-smith", "UTC").await;
    let (_, token) = book_slot(&app, 10).await;
    let date = upcoming(Weekday::Wed);

    let res = app
        .post_json(&format!("/api/v1/bookings/manage/{}/cancel", token), json!({"reason": "  "}), None)
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app
        .post_json(
            &format!("/api/v1/bookings/manage/{}/cancel", token),
            json!({"reason": "Feeling better"}),
            None,
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body["status"], "cancelled");
    assert_eq!(body["cancel_reason"], "Feeling better");

    // The interval is bookable again.
    let res = app.get(&format!("/api/v1/therapists/dr-smith/slots?date={}", date)).await;
    let slots = body_json(res).await;
    assert_eq!(slots.as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn test_client_reschedule_moves_the_booking() {
    let app = TestApp::new().await;
    app.seed_therapist("dr-smith", "UTC").await;
    let (_, token) = book_slot(&app, 10).await;

    let date = upcoming(Weekday::Wed);
    let new_start = Utc.from_utc_datetime(&date.and_hms_opt(15, 0, 0).unwrap());
    let res = app
        .post_json(
            &format!("/api/v1/bookings/manage/{}/reschedule", token),
            json!({"start": new_start.to_rfc3339()}),
            None,
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert!(body["start_at"].as_str().unwrap().contains("T15:00:00"));

    // A reschedule notification joins the confirmation in the queue.
    let jobs = app.state.job_repo.find_pending(10).await.unwrap();
    assert!(jobs.iter().any(|j| j.job_type == "RESCHEDULE"));
}

#[tokio::test]
async fn test_reschedule_into_occupied_slot_conflicts() {
    let app = TestApp::new().await;
    app.seed_therapist("dr-smith", "UTC").await;
    let (_, token) = book_slot(&app, 10).await;
    book_slot(&app, 15).await;

    let date = upcoming(Weekday::Wed);
    let new_start = Utc.from_utc_datetime(&date.and_hms_opt(15, 0, 0).unwrap());
    let res = app
        .post_json(
            &format!("/api/v1/bookings/manage/{}/reschedule", token),
            json!({"start": new_start.to_rfc3339()}),
            None,
        )
        .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // Nothing moved.
    let res = app.get(&format!("/api/v1/bookings/manage/{}", token)).await;
    let body = body_json(res).await;
    assert!(body["start_at"].as_str().unwrap().contains("T10:00:00"));
}

#[tokio::test]
async fn test_reschedule_onto_own_slot_is_allowed() {
    let app = TestApp::new().await;
    app.seed_therapist("dr-smith", "UTC").await;
    let (_, token) = book_slot(&app, 10).await;

    // The booking's own interval is excluded from its conflict set.
    let date = upcoming(Weekday::Wed);
    let same_start = Utc.from_utc_datetime(&date.and_hms_opt(10, 0, 0).unwrap());
    let res = app
        .post_json(
            &format!("/api/v1/bookings/manage/{}/reschedule", token),
            json!({"start": same_start.to_rfc3339()}),
            None,
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_cancelled_booking_cannot_be_rescheduled() {
    let app = TestApp::new().await;
    app.seed_therapist("dr-smith", "UTC").await;
    let (_, token) = book_slot(&app, 10).await;

    app.post_json(
        &format!("/api/v1/bookings/manage/{}/cancel", token),
        json!({"reason": "done"}),
        None,
    )
    .await;

    let date = upcoming(Weekday::Wed);
    let new_start = Utc.from_utc_datetime(&date.and_hms_opt(15, 0, 0).unwrap());
    let res = app
        .post_json(
            &format!("/api/v1/bookings/manage/{}/reschedule", token),
            json!({"start": new_start.to_rfc3339()}),
            None,
        )
        .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}
