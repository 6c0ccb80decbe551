mod common;

use axum::http::StatusCode;
use chrono::{TimeZone, Utc, Weekday};
use common::{body_json, upcoming, SentEmail, TestApp};
use serde_json::json;
use std::time::Duration;

/// The worker wakes every five seconds; give it two cycles plus slack.
async fn wait_for_emails(app: &TestApp, count: usize) -> Vec<SentEmail> {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(15);
    loop {
        let sent = app.emails.sent.lock().unwrap().clone();
        if sent.len() >= count {
            return sent;
        }
        if tokio::time::Instant::now() > deadline {
            panic!("expected {} emails, got {}", count, sent.len());
        }
        tokio::time::sleep(Duration::from_millis(250)).await;
    }
}

#[tokio::test]
async fn test_worker_sends_confirmation_then_cancellation() {
    let app = TestApp::with_worker().await;
    app.seed_therapist("dr-mail", "UTC").await;

    let monday = upcoming(Weekday::Mon);
    let start = Utc
        .from_utc_datetime(&monday.and_hms_opt(10, 0, 0).unwrap())
        .to_rfc3339();

    let res = app
        .post_json(
            "/api/v1/therapists/dr-mail/book",
            json!({
                "start": start,
                "client_name": "Ana Client",
                "client_email": "ana@example.com",
                "meeting_type": "video"
            }),
            None,
        )
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let booking = body_json(res).await;
    let token = booking["management_token"].as_str().unwrap().to_string();
    let reference = booking["reference"].as_str().unwrap().to_string();

    let sent = wait_for_emails(&app, 1).await;
    let confirmation = &sent[0];
    assert_eq!(confirmation.recipient, "ana@example.com");
    assert_eq!(confirmation.subject, "Your session is booked");
    assert!(confirmation.body.contains(&reference));
    assert_eq!(confirmation.attachment_name.as_deref(), Some("session.ics"));

    // Confirmation provisions the video room and persists the link.
    let res = app.get(&format!("/api/v1/bookings/manage/{}", token)).await;
    let booking = body_json(res).await;
    let booking_id = booking["id"].as_str().unwrap();
    assert_eq!(
        booking["meeting_link"].as_str().unwrap(),
        format!("https://meet.example.com/{}", booking_id)
    );

    let res = app
        .post_json(
            &format!("/api/v1/bookings/manage/{}/cancel", token),
            json!({"reason": "Something came up"}),
            None,
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let sent = wait_for_emails(&app, 2).await;
    let cancellation = &sent[1];
    assert_eq!(cancellation.recipient, "ana@example.com");
    assert_eq!(cancellation.subject, "Your session was cancelled");
    // Cancellations carry no calendar invite.
    assert!(cancellation.attachment_name.is_none());
}
