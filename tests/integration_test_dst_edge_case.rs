mod common;

use axum::http::StatusCode;
use chrono::NaiveTime;
use common::{body_json, TestApp};
use therapy_booking_backend::domain::models::availability_rule::AvailabilityRule;
use therapy_booking_backend::domain::models::therapist::{NewTherapistParams, Therapist};

async fn seed_berlin_night_owl(app: &TestApp) -> Therapist {
    let therapist = Therapist::new(NewTherapistParams {
        user_id: "user-berlin".into(),
        slug: "dr-berlin".into(),
        name: "Dr. Berlin".into(),
        email: "berlin@example.com".into(),
        timezone: "Europe/Berlin".into(),
        default_session_duration_min: 60,
        buffer_min: 0,
        advance_booking_days: 1000,
        min_booking_notice_hours: 0,
    });
    let created = app.state.therapist_repo.create(&therapist).await.unwrap();
    // Early-morning window on every weekday, straddling the DST jump hour.
    for day in 0..=6 {
        let rule = AvailabilityRule::new(
            created.id.clone(),
            day,
            NaiveTime::from_hms_opt(1, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(4, 0, 0).unwrap(),
        );
        app.state.rule_repo.create(&rule).await.unwrap();
    }
    created
}

#[tokio::test]
async fn test_spring_forward_skips_the_missing_hour() {
    let app = TestApp::new().await;
    seed_berlin_night_owl(&app).await;

    // Berlin spring forward: 2027-03-28, 02:00 local jumps to 03:00.
    let res = app
        .get("/api/v1/therapists/dr-berlin/slots?date=2027-03-28&timezone=Europe/Berlin")
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let slots = body_json(res).await;
    let locals: Vec<String> = slots
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["start_local"].as_str().unwrap().to_string())
        .collect();

    // 01:00 exists (CET), 02:00 does not exist, 03:00 exists (CEST).
    assert_eq!(locals, vec!["01:00", "03:00"]);

    let starts: Vec<&str> = slots
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["start"].as_str().unwrap())
        .collect();
    // 01:00 CET = 00:00 UTC; 03:00 CEST = 01:00 UTC. They are adjacent
    // instants even though the wall clock shows a two-hour gap.
    assert!(starts[0].contains("T00:00:00"));
    assert!(starts[1].contains("T01:00:00"));
}

#[tokio::test]
async fn test_ordinary_day_keeps_all_three_slots() {
    let app = TestApp::new().await;
    seed_berlin_night_owl(&app).await;

    let res = app
        .get("/api/v1/therapists/dr-berlin/slots?date=2027-03-27&timezone=Europe/Berlin")
        .await;
    let slots = body_json(res).await;
    let locals: Vec<String> = slots
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["start_local"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(locals, vec!["01:00", "02:00", "03:00"]);
}

#[tokio::test]
async fn test_fall_back_skips_the_ambiguous_hour() {
    let app = TestApp::new().await;
    seed_berlin_night_owl(&app).await;

    // Berlin fall back: 2026-10-25, 03:00 CEST rewinds to 02:00 CET, so
    // 02:xx wall times happen twice. Ambiguous candidates are dropped
    // rather than guessed at.
    let res = app
        .get("/api/v1/therapists/dr-berlin/slots?date=2026-10-25&timezone=Europe/Berlin")
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let slots = body_json(res).await;
    let locals: Vec<String> = slots
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["start_local"].as_str().unwrap().to_string())
        .collect();

    assert!(locals.contains(&"01:00".to_string()));
    assert!(!locals.contains(&"02:00".to_string()));
    assert!(locals.contains(&"03:00".to_string()));
}
