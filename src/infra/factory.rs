use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use log::LevelFilter;
use tracing::info;
use tera::Tera;

use crate::config::Config;
use crate::state::AppState;
use crate::domain::ports::MeetingLinkService;
use crate::domain::services::{availability::AvailabilityService, reservation::ReservationService};
use crate::infra::email::http_email_service::HttpEmailService;
use crate::infra::meeting::http_meeting_service::{HttpMeetingService, NoopMeetingService};
use crate::infra::repositories::{
    postgres_therapist_repo::PostgresTherapistRepo, postgres_rule_repo::PostgresRuleRepo,
    postgres_blocked_repo::PostgresBlockedRepo, postgres_session_type_repo::PostgresSessionTypeRepo,
    postgres_booking_repo::PostgresBookingRepo, postgres_job_repo::PostgresJobRepo,
    sqlite_therapist_repo::SqliteTherapistRepo, sqlite_rule_repo::SqliteRuleRepo,
    sqlite_blocked_repo::SqliteBlockedRepo, sqlite_session_type_repo::SqliteSessionTypeRepo,
    sqlite_booking_repo::SqliteBookingRepo, sqlite_job_repo::SqliteJobRepo,
};

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;

    let email_service = Arc::new(HttpEmailService::new(
        config.mail_service_url.clone(),
        config.mail_service_token.clone(),
    ));

    let meeting_service: Arc<dyn MeetingLinkService> = match &config.meeting_service_url {
        Some(url) => Arc::new(HttpMeetingService::new(url.clone())),
        None => Arc::new(NoopMeetingService),
    };

    let mut tera = Tera::default();
    tera.add_raw_template("confirmation.html", include_str!("../templates/confirmation.html"))
        .expect("Failed to load confirmation template");
    tera.add_raw_template("cancellation.html", include_str!("../templates/cancellation.html"))
        .expect("Failed to load cancellation template");
    tera.add_raw_template("reschedule.html", include_str!("../templates/reschedule.html"))
        .expect("Failed to load reschedule template");
    let templates = Arc::new(tera);

    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;

        let therapist_repo = Arc::new(PostgresTherapistRepo::new(pool.clone()));
        let rule_repo = Arc::new(PostgresRuleRepo::new(pool.clone()));
        let blocked_repo = Arc::new(PostgresBlockedRepo::new(pool.clone()));
        let session_type_repo = Arc::new(PostgresSessionTypeRepo::new(pool.clone()));
        let booking_repo = Arc::new(PostgresBookingRepo::new(pool.clone()));

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

        AppState {
            config: config.clone(),
            therapist_repo,
            rule_repo,
            blocked_repo,
            session_type_repo,
            booking_repo,
            job_repo: Arc::new(PostgresJobRepo::new(pool.clone())),
            availability,
            reservation,
            email_service,
            meeting_service,
            templates,
        }
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;

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

        AppState {
            config: config.clone(),
            therapist_repo,
            rule_repo,
            blocked_repo,
            session_type_repo,
            booking_repo,
            job_repo: Arc::new(SqliteJobRepo::new(pool.clone())),
            availability,
            reservation,
            email_service,
            meeting_service,
            templates,
        }
    }
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
