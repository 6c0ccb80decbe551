mod common;

use axum::http::StatusCode;
use chrono::{TimeZone, Utc, Weekday};
use common::{upcoming, TestApp};
use serde_json::json;

/// Two clients race for the same slot; the commit-time overlap check under
/// the write lock must let exactly one of them through.
#[tokio::test]
async fn test_concurrent_bookings_have_one_winner() {
    let app = TestApp::new().await;
    app.seed_therapist("dr-smith", "UTC").await;
    let date = upcoming(Weekday::Fri);
    let start = Utc.from_utc_datetime(&date.and_hms_opt(10, 0, 0).unwrap());

    let payload_a = json!({"start": start.to_rfc3339(), "client_name": "A", "client_email": "a@example.com"});
    let payload_b = json!({"start": start.to_rfc3339(), "client_name": "B", "client_email": "b@example.com"});

    let (res_a, res_b) = tokio::join!(
        app.post_json("/api/v1/therapists/dr-smith/book", payload_a, None),
        app.post_json("/api/v1/therapists/dr-smith/book", payload_b, None),
    );

    let statuses = [res_a.status(), res_b.status()];
    let created = statuses.iter().filter(|s| **s == StatusCode::CREATED).count();
    let conflicted = statuses.iter().filter(|s| **s == StatusCode::CONFLICT).count();

    assert_eq!(created, 1, "exactly one booking must win, got {:?}", statuses);
    assert_eq!(conflicted, 1, "the loser must see a conflict, got {:?}", statuses);

    let bookings = app
        .state
        .booking_repo
        .list_occupying_in_range(
            &app.state.therapist_repo.find_by_slug("dr-smith").await.unwrap().unwrap().id,
            start,
            start + chrono::Duration::hours(1),
        )
        .await
        .unwrap();
    assert_eq!(bookings.len(), 1);
}

/// Same race across many rounds and slots, to shake out timing windows the
/// single-shot test can miss.
#[tokio::test]
async fn test_repeated_races_never_double_book() {
    let app = TestApp::new().await;
    let therapist = app.seed_therapist("dr-smith", "UTC").await;
    let date = upcoming(Weekday::Fri);

    for hour in 9..14 {
        let start = Utc.from_utc_datetime(&date.and_hms_opt(hour, 0, 0).unwrap());
        let mk = |name: &str| {
            json!({"start": start.to_rfc3339(), "client_name": name, "client_email": format!("{}@example.com", name)})
        };

        let (a, b, c) = tokio::join!(
            app.post_json("/api/v1/therapists/dr-smith/book", mk("a"), None),
            app.post_json("/api/v1/therapists/dr-smith/book", mk("b"), None),
            app.post_json("/api/v1/therapists/dr-smith/book", mk("c"), None),
        );
        let winners = [a.status(), b.status(), c.status()]
            .iter()
            .filter(|s| **s == StatusCode::CREATED)
            .count();
        assert_eq!(winners, 1, "hour {} had {} winners", hour, winners);
    }

    let all = app.state.booking_repo.list_by_therapist(&therapist.id).await.unwrap();
    assert_eq!(all.len(), 5);
}
