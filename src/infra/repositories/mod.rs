pub mod postgres_blocked_repo;
pub mod postgres_booking_repo;
pub mod postgres_job_repo;
pub mod postgres_rule_repo;
pub mod postgres_session_type_repo;
pub mod postgres_therapist_repo;
pub mod sqlite_blocked_repo;
pub mod sqlite_booking_repo;
pub mod sqlite_job_repo;
pub mod sqlite_rule_repo;
pub mod sqlite_session_type_repo;
pub mod sqlite_therapist_repo;
