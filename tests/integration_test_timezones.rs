mod common;

use axum::http::StatusCode;
use chrono::Weekday;
use common::{body_json, upcoming, TestApp};

#[tokio::test]
async fn test_slots_render_in_requested_timezone() {
    let app = TestApp::new().await;
    // Rules are wall-clock in the therapist's zone.
    app.seed_therapist("dr-berlin", "Europe/Berlin").await;
    let date = upcoming(Weekday::Mon);

    let res = app
        .get(&format!("/api/v1/therapists/dr-berlin/slots?date={}&timezone=Europe/Berlin", date))
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let slots = body_json(res).await;
    let slots = slots.as_array().unwrap().clone();

    assert_eq!(slots.len(), 8);
    assert_eq!(slots[0]["start_local"], "09:00");
    // Berlin is ahead of UTC, so the UTC instant is earlier than 09:00.
    let utc_start = slots[0]["start"].as_str().unwrap();
    assert!(utc_start.contains("T07:00:00") || utc_start.contains("T08:00:00"));
}

#[tokio::test]
async fn test_request_day_resolves_across_the_dateline() {
    let app = TestApp::new().await;
    // Auckland mornings land on the previous UTC calendar day.
    app.seed_therapist("dr-auckland", "Pacific/Auckland").await;
    let monday = upcoming(Weekday::Mon);

    // Asking for UTC-Sunday must surface the Auckland-Monday morning slots
    // whose instants fall inside that UTC day.
    let sunday = monday - chrono::Duration::days(1);
    let res = app
        .get(&format!("/api/v1/therapists/dr-auckland/slots?date={}&timezone=UTC", sunday))
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let slots = body_json(res).await;

    assert!(
        !slots.as_array().unwrap().is_empty(),
        "Auckland Monday-morning slots must appear on the UTC Sunday page"
    );
    for slot in slots.as_array().unwrap() {
        let start: chrono::DateTime<chrono::Utc> = slot["start"].as_str().unwrap().parse().unwrap();
        assert_eq!(start.date_naive(), sunday, "slot {} is outside the requested UTC day", start);
    }
}

#[tokio::test]
async fn test_same_day_viewed_from_two_zones_partitions_cleanly() {
    let app = TestApp::new().await;
    app.seed_therapist("dr-auckland", "Pacific/Auckland").await;
    let monday = upcoming(Weekday::Mon);
    let sunday = monday - chrono::Duration::days(1);

    let res_sun = app
        .get(&format!("/api/v1/therapists/dr-auckland/slots?date={}&timezone=UTC", sunday))
        .await;
    let res_mon = app
        .get(&format!("/api/v1/therapists/dr-auckland/slots?date={}&timezone=UTC", monday))
        .await;
    let sun = body_json(res_sun).await;
    let mon = body_json(res_mon).await;

    let mut all: Vec<String> = sun
        .as_array()
        .unwrap()
        .iter()
        .chain(mon.as_array().unwrap())
        .map(|s| s["start"].as_str().unwrap().to_string())
        .collect();
    let before = all.len();
    all.sort();
    all.dedup();
    // No slot appears on both UTC pages.
    assert_eq!(before, all.len());
}
