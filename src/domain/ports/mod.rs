use crate::domain::models::{
    therapist::Therapist,
    availability_rule::AvailabilityRule,
    blocked_interval::BlockedInterval,
    session_type::SessionType,
    booking::Booking,
    job::Job,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait TherapistRepository: Send + Sync {
    async fn create(&self, therapist: &Therapist) -> Result<Therapist, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Therapist>, AppError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Therapist>, AppError>;
    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<Therapist>, AppError>;
    async fn list_active(&self) -> Result<Vec<Therapist>, AppError>;
    async fn update(&self, therapist: &Therapist) -> Result<Therapist, AppError>;
    /// Soft delete: archived therapists keep their bookings but drop out of
    /// availability queries.
    async fn archive(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait AvailabilityRuleRepository: Send + Sync {
    async fn create(&self, rule: &AvailabilityRule) -> Result<AvailabilityRule, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<AvailabilityRule>, AppError>;
    async fn list_by_therapist(&self, therapist_id: &str) -> Result<Vec<AvailabilityRule>, AppError>;
    async fn list_active(&self, therapist_id: &str) -> Result<Vec<AvailabilityRule>, AppError>;
    async fn update(&self, rule: &AvailabilityRule) -> Result<AvailabilityRule, AppError>;
    async fn delete(&self, therapist_id: &str, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait BlockedIntervalRepository: Send + Sync {
    async fn create(&self, interval: &BlockedInterval) -> Result<BlockedInterval, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<BlockedInterval>, AppError>;
    async fn list_by_therapist(&self, therapist_id: &str) -> Result<Vec<BlockedInterval>, AppError>;
    async fn list_in_range(&self, therapist_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<BlockedInterval>, AppError>;
    async fn delete(&self, therapist_id: &str, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait SessionTypeRepository: Send + Sync {
    async fn create(&self, session_type: &SessionType) -> Result<SessionType, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<SessionType>, AppError>;
    async fn list_by_therapist(&self, therapist_id: &str) -> Result<Vec<SessionType>, AppError>;
    async fn update(&self, session_type: &SessionType) -> Result<SessionType, AppError>;
    async fn delete(&self, therapist_id: &str, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Atomic commit: inside one transaction, serialize on the therapist's
    /// booking set, re-run the half-open overlap check against
    /// {pending, confirmed} bookings and insert. Overlap means
    /// `AppError::SlotConflict` and no row is written. Notification jobs are
    /// inserted in the same transaction.
    async fn create_reserved(&self, booking: &Booking, jobs: Vec<Job>) -> Result<Booking, AppError>;
    /// Atomic move: same overlap discipline as `create_reserved`, excluding
    /// the booking being moved from the conflict set. Either the booking gets
    /// its new window or nothing changes.
    async fn reschedule_reserved(&self, booking: &Booking, new_start: DateTime<Utc>, new_end: DateTime<Utc>, jobs: Vec<Job>) -> Result<Booking, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError>;
    async fn find_by_reference(&self, reference: &str) -> Result<Option<Booking>, AppError>;
    async fn find_by_management_token(&self, token: &str) -> Result<Option<Booking>, AppError>;
    async fn list_by_therapist(&self, therapist_id: &str) -> Result<Vec<Booking>, AppError>;
    /// Bookings occupying time (pending or confirmed) intersecting [start, end).
    async fn list_occupying_in_range(&self, therapist_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Booking>, AppError>;
    /// Persists status, cancel_reason and meeting_link.
    async fn update_state(&self, booking: &Booking, jobs: Vec<Job>) -> Result<Booking, AppError>;
}

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn create(&self, job: &Job) -> Result<Job, AppError>;
    async fn find_pending(&self, limit: i64) -> Result<Vec<Job>, AppError>;
    async fn update_status(&self, id: &str, status: &str, error_message: Option<String>) -> Result<(), AppError>;
}

#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        html_body: &str,
        attachment_name: Option<&str>,
        attachment_data: Option<&[u8]>,
    ) -> Result<(), AppError>;
}

/// Optional meeting-link provider for video sessions. A `None` link or a
/// failed call never blocks booking creation.
#[async_trait]
pub trait MeetingLinkService: Send + Sync {
    async fn create_meeting_link(
        &self,
        booking_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        attendees: &[String],
    ) -> Result<Option<String>, AppError>;
}
