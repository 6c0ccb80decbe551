use therapy_booking_backend::{
    api::router::create_router,
    background::start_background_worker,
    config::Config,
    domain::models::availability_rule::AvailabilityRule,
    domain::models::therapist::{NewTherapistParams, Therapist},
    domain::ports::{EmailService, MeetingLinkService},
    domain::services::{availability::AvailabilityService, reservation::ReservationService},
    error::AppError,
    infra::repositories::{
        sqlite_blocked_repo::SqliteBlockedRepo, sqlite_booking_repo::SqliteBookingRepo,
        sqlite_job_repo::SqliteJobRepo, sqlite_rule_repo::SqliteRuleRepo,
        sqlite_session_type_repo::SqliteSessionTypeRepo, sqlite_therapist_repo::SqliteTherapistRepo,
    },
    state::AppState,
};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use chrono::{DateTime, Datelike, NaiveTime, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tera::Tera;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_ISSUER: &str = "test-issuer";

#[derive(Clone, Default)]
pub struct SentEmail {
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub attachment_name: Option<String>,
}

/// Records every send so tests can assert on notification side effects.
#[derive(Default)]
pub struct MockEmailService {
    pub sent: Mutex<Vec<SentEmail>>,
}

#[async_trait]
impl EmailService for MockEmailService {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        html_body: &str,
        attachment_name: Option<&str>,
        _attachment_data: Option<&[u8]>,
    ) -> Result<(), AppError> {
        self.sent.lock().unwrap().push(SentEmail {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            body: html_body.to_string(),
            attachment_name: attachment_name.map(str::to_string),
        });
        Ok(())
    }
}

pub struct MockMeetingService;

#[async_trait]
impl MeetingLinkService for MockMeetingService {
    async fn create_meeting_link(
        &self,
        booking_id: &str,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
        _attendees: &[String],
    ) -> Result<Option<String>, AppError> {
        Ok(Some(format!("https://meet.example.com/{}", booking_id)))
    }
}

#[derive(Serialize)]
struct TestClaims {
    sub: String,
    role: String,
    email: String,
    iss: String,
    exp: usize,
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub emails: Arc<MockEmailService>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::build(false).await
    }

    /// Same as `new`, with the notification worker running.
    pub async fn with_worker() -> Self {
        Self::build(true).await
    }

    async fn build(start_worker: bool) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let mut tera = Tera::default();
        tera.add_raw_template("confirmation.html", "<html>Confirmed {{ reference }} for {{ client_name }}</html>").unwrap();
        tera.add_raw_template("cancellation.html", "<html>Cancelled {{ reference }}</html>").unwrap();
        tera.add_raw_template("reschedule.html", "<html>Moved {{ reference }} to {{ start_local }}</html>").unwrap();
        let templates = Arc::new(tera);

        let pub_key_pem = include_str!("keys/test_public.pem");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            mail_service_url: "http://localhost".to_string(),
            mail_service_token: "token".to_string(),
            meeting_service_url: None,
            auth_public_key: pub_key_pem.to_string(),
            auth_issuer: TEST_ISSUER.to_string(),
        };

        let therapist_repo = Arc::new(SqliteTherapistRepo::new(pool.clone()));
        let rule_repo = Arc::new(SqliteRuleRepo::new(pool.clone()));
        let blocked_repo = Arc::new(SqliteBlockedRepo::new(pool.clone()));
        let session_type_repo = Arc::new(SqliteSessionTypeRepo::new(pool.clone()));
        let booking_repo = Arc::new(SqliteBookingRepo::new(pool.clone()));

        let availability = Arc::new(AvailabilityService::new(
            therapist_repo.clone(),
            rule_repo.clone(),
            blocked_repo.clone(),
            booking_repo.clone(),
        ));
        let reservation = Arc::new(ReservationService::new(
            therapist_repo.clone(),
            session_type_repo.clone(),
            booking_repo.clone(),
            availability.clone(),
        ));

        let emails = Arc::new(MockEmailService::default());

        let state = Arc::new(AppState {
            config: config.clone(),
            therapist_repo,
            rule_repo,
            blocked_repo,
            session_type_repo,
            booking_repo,
            job_repo: Arc::new(SqliteJobRepo::new(pool.clone())),
            availability,
            reservation,
            email_service: emails.clone(),
            meeting_service: Arc::new(MockMeetingService),
            templates,
        });

        if start_worker {
            let worker_state = state.clone();
            tokio::spawn(async move {
                start_background_worker(worker_state).await;
            });
        }

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            emails,
        }
    }

    pub fn token_for(&self, user_id: &str, role: &str) -> String {
        let claims = TestClaims {
            sub: user_id.to_string(),
            role: role.to_string(),
            email: format!("{}@example.com", user_id),
            iss: TEST_ISSUER.to_string(),
            exp: (Utc::now().timestamp() + 3600) as usize,
        };
        let key = EncodingKey::from_ed_pem(include_bytes!("keys/test_private.pem")).unwrap();
        encode(&Header::new(Algorithm::EdDSA), &claims, &key).unwrap()
    }

    pub fn admin_token(&self) -> String {
        self.token_for("u-admin", "admin")
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    pub async fn post_json(&self, uri: &str, body: Value, token: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.router
            .clone()
            .oneshot(builder.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap()
    }

    pub async fn get_auth(&self, uri: &str, token: &str) -> Response<Body> {
        self.router
            .clone()
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    /// Seeds an active therapist with Monday-to-Friday 09:00-17:00 rules.
    pub async fn seed_therapist(&self, slug: &str, timezone: &str) -> Therapist {
        let therapist = Therapist::new(NewTherapistParams {
            user_id: format!("user-{}", slug),
            slug: slug.to_string(),
            name: format!("Dr. {}", slug),
            email: format!("{}@example.com", slug),
            timezone: timezone.to_string(),
            default_session_duration_min: 60,
            buffer_min: 0,
            advance_booking_days: 60,
            min_booking_notice_hours: 0,
        });
        let created = self.state.therapist_repo.create(&therapist).await.unwrap();

        for day in 1..=5 {
            let rule = AvailabilityRule::new(
                created.id.clone(),
                day,
                NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            );
            self.state.rule_repo.create(&rule).await.unwrap();
        }
        created
    }
}

/// First `weekday` at least two days out, so notice windows and "today is
/// already half over" effects cannot bleed into assertions.
pub fn upcoming(weekday: chrono::Weekday) -> chrono::NaiveDate {
    let mut date = Utc::now().date_naive() + chrono::Duration::days(2);
    while date.weekday() != weekday {
        date += chrono::Duration::days(1);
    }
    date
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
    }
}
