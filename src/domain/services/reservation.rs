use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use crate::domain::models::booking::{self, Booking, BookingStatus, NewBookingParams};
use crate::domain::models::job::Job;
use crate::domain::models::session_type::MEETING_TYPES;
use crate::domain::models::therapist::Therapist;
use crate::domain::ports::{BookingRepository, SessionTypeRepository, TherapistRepository};
use crate::domain::services::availability::AvailabilityService;
use crate::domain::services::policy::{self, Actor};
use crate::domain::services::slots;
use crate::error::AppError;

pub struct CreateBookingCommand {
    pub therapist_id: String,
    pub session_type_id: Option<String>,
    pub start: DateTime<Utc>,
    /// Explicit duration; defaults to the session type's, then the
    /// therapist's default.
    pub duration_min: Option<i32>,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: Option<String>,
    pub notes: Option<String>,
    pub meeting_type: Option<String>,
    /// Staff-created bookings start out confirmed; self-service ones pending.
    pub created_by_staff: bool,
}

/// Write side of the booking funnel. All mutations are all-or-nothing: a
/// failed call leaves no partial booking state behind.
pub struct ReservationService {
    therapist_repo: Arc<dyn TherapistRepository>,
    session_type_repo: Arc<dyn SessionTypeRepository>,
    booking_repo: Arc<dyn BookingRepository>,
    availability: Arc<AvailabilityService>,
}

impl ReservationService {
    pub fn new(
        therapist_repo: Arc<dyn TherapistRepository>,
        session_type_repo: Arc<dyn SessionTypeRepository>,
        booking_repo: Arc<dyn BookingRepository>,
        availability: Arc<AvailabilityService>,
    ) -> Self {
        Self {
            therapist_repo,
            session_type_repo,
            booking_repo,
            availability,
        }
    }

    /// Re-validates the requested slot against current state, then commits
    /// through the repository's atomic overlap-check-and-insert. The caller's
    /// earlier availability read is never trusted.
    pub async fn create(&self, cmd: CreateBookingCommand) -> Result<Booking, AppError> {
        let therapist = self
            .therapist_repo
            .find_by_id(&cmd.therapist_id)
            .await?
            .filter(|t| t.is_active)
            .ok_or(AppError::NotFound("Therapist not found".into()))?;

        let (duration_min, meeting_type) = self.resolve_session_shape(&therapist, &cmd).await?;

        if cmd.client_name.trim().is_empty() {
            return Err(AppError::Validation("Client name is required".into()));
        }
        if !cmd.client_email.contains('@') {
            return Err(AppError::Validation("Client email is invalid".into()));
        }

        let now = Utc::now();
        self.assert_slot_available(&therapist, cmd.start, duration_min, now, None).await?;

        let mut booking = Booking::new(NewBookingParams {
            therapist_id: therapist.id.clone(),
            session_type_id: cmd.session_type_id,
            start: cmd.start,
            duration_min,
            client_name: cmd.client_name,
            client_email: cmd.client_email,
            client_phone: cmd.client_phone,
            notes: cmd.notes,
            meeting_type,
            status: if cmd.created_by_staff { BookingStatus::Confirmed } else { BookingStatus::Pending },
        });
        booking.reference = self.unique_reference().await?;

        let jobs = vec![Job::new("CONFIRMATION", booking.id.clone(), therapist.id.clone(), now)];

        let created = self.booking_repo.create_reserved(&booking, jobs).await?;
        info!(
            booking_id = %created.id,
            reference = %created.reference,
            therapist_id = %therapist.id,
            status = %created.status,
            "booking created"
        );
        Ok(created)
    }

    /// Cancel-old + validate-new as one atomic move. The moved booking is
    /// excluded from its own conflict set.
    pub async fn reschedule(
        &self,
        booking_id: &str,
        new_start: DateTime<Utc>,
        actor: Option<&Actor>,
    ) -> Result<Booking, AppError> {
        let booking = self.require_booking(booking_id).await?;
        let therapist = self.require_therapist(&booking.therapist_id).await?;
        self.authorize(actor, &therapist)?;

        if !booking.status.occupies_slot() {
            return Err(AppError::InvalidTransition(format!(
                "Cannot reschedule a {} booking",
                booking.status
            )));
        }

        let duration_min = (booking.end_at - booking.start_at).num_minutes() as i32;
        let now = Utc::now();
        self.assert_slot_available(&therapist, new_start, duration_min, now, Some(&booking.id)).await?;

        let new_end = new_start + Duration::minutes(duration_min as i64);
        let jobs = vec![Job::new("RESCHEDULE", booking.id.clone(), therapist.id.clone(), now)];

        let updated = self
            .booking_repo
            .reschedule_reserved(&booking, new_start, new_end, jobs)
            .await?;
        info!(booking_id = %updated.id, start = %updated.start_at, "booking rescheduled");
        Ok(updated)
    }

    /// Allowed from pending or confirmed; the freed interval shows up in
    /// availability queries immediately.
    pub async fn cancel(
        &self,
        booking_id: &str,
        reason: &str,
        actor: Option<&Actor>,
    ) -> Result<Booking, AppError> {
        let mut booking = self.require_booking(booking_id).await?;
        let therapist = self.require_therapist(&booking.therapist_id).await?;
        self.authorize(actor, &therapist)?;

        if reason.trim().is_empty() {
            return Err(AppError::Validation("A cancellation reason is required".into()));
        }
        if !booking.status.can_transition_to(BookingStatus::Cancelled) {
            return Err(AppError::InvalidTransition(format!(
                "Cannot cancel a {} booking",
                booking.status
            )));
        }

        booking.status = BookingStatus::Cancelled;
        booking.cancel_reason = Some(reason.to_string());

        let jobs = vec![Job::new("CANCELLATION", booking.id.clone(), therapist.id.clone(), Utc::now())];
        let cancelled = self.booking_repo.update_state(&booking, jobs).await?;
        info!(booking_id = %cancelled.id, "booking cancelled");
        Ok(cancelled)
    }

    /// confirm / complete / no_show. Cancellation goes through `cancel` so
    /// the reason is always recorded.
    pub async fn transition(
        &self,
        booking_id: &str,
        next: BookingStatus,
        actor: &Actor,
    ) -> Result<Booking, AppError> {
        let mut booking = self.require_booking(booking_id).await?;
        let therapist = self.require_therapist(&booking.therapist_id).await?;
        self.authorize(Some(actor), &therapist)?;

        if next == BookingStatus::Cancelled {
            return Err(AppError::Validation(
                "Use the cancel operation; cancellation requires a reason".into(),
            ));
        }
        if !booking.status.can_transition_to(next) {
            return Err(AppError::InvalidTransition(format!(
                "Cannot move a {} booking to {}",
                booking.status, next
            )));
        }
        if matches!(next, BookingStatus::Completed | BookingStatus::NoShow)
            && booking.end_at > Utc::now()
        {
            return Err(AppError::InvalidTransition(
                "Session has not ended yet".into(),
            ));
        }

        booking.status = next;
        let updated = self.booking_repo.update_state(&booking, vec![]).await?;
        info!(booking_id = %updated.id, status = %updated.status, "booking status changed");
        Ok(updated)
    }

    async fn resolve_session_shape(
        &self,
        therapist: &Therapist,
        cmd: &CreateBookingCommand,
    ) -> Result<(i32, String), AppError> {
        let (base_duration, base_meeting_type) = match &cmd.session_type_id {
            Some(id) => {
                let session_type = self
                    .session_type_repo
                    .find_by_id(id)
                    .await?
                    .filter(|st| st.therapist_id == therapist.id && st.is_active)
                    .ok_or(AppError::NotFound("Session type not found".into()))?;
                (session_type.duration_min, Some(session_type.meeting_type))
            }
            None => (therapist.default_session_duration_min, None),
        };

        let duration = cmd.duration_min.unwrap_or(base_duration);
        if duration <= 0 {
            return Err(AppError::Validation("Duration must be positive".into()));
        }

        let meeting_type = cmd
            .meeting_type
            .clone()
            .or(base_meeting_type)
            .unwrap_or_else(|| "in_person".to_string());
        if !MEETING_TYPES.contains(&meeting_type.as_str()) {
            return Err(AppError::Validation("Invalid meeting type".into()));
        }

        Ok((duration, meeting_type))
    }

    /// Stale-read protection: the requested start must be a currently
    /// generated candidate, and an available one. The repository repeats the
    /// overlap check under its lock for the race window this read cannot
    /// close.
    async fn assert_slot_available(
        &self,
        therapist: &Therapist,
        start: DateTime<Utc>,
        duration_min: i32,
        now: DateTime<Utc>,
        exclude_booking_id: Option<&str>,
    ) -> Result<(), AppError> {
        if start <= now {
            return Err(AppError::Validation("Cannot book in the past".into()));
        }

        let tz = slots::parse_timezone(&therapist.timezone).unwrap_or(chrono_tz::UTC);
        let local_date = start.with_timezone(&tz).date_naive();

        let candidates = self
            .availability
            .candidates_for_date(therapist, local_date, duration_min, tz, now, exclude_booking_id)
            .await?;

        match candidates.iter().find(|s| s.start == start) {
            None => Err(AppError::Validation(
                "Selected time is not a bookable slot".into(),
            )),
            Some(slot) if !slot.available => {
                warn!(therapist_id = %therapist.id, start = %start, "slot no longer available");
                Err(AppError::SlotConflict(
                    "Someone just booked that slot. Please pick another one.".into(),
                ))
            }
            Some(_) => Ok(()),
        }
    }

    async fn unique_reference(&self) -> Result<String, AppError> {
        // Collisions in a 36^8 space are unlikely; the unique index is the
        // final arbiter.
        for _ in 0..5 {
            let candidate = booking::generate_reference();
            if self.booking_repo.find_by_reference(&candidate).await?.is_none() {
                return Ok(candidate);
            }
        }
        Err(AppError::InternalWithMsg(
            "Could not generate a unique booking reference".into(),
        ))
    }

    async fn require_booking(&self, id: &str) -> Result<Booking, AppError> {
        self.booking_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Booking not found".into()))
    }

    async fn require_therapist(&self, id: &str) -> Result<Therapist, AppError> {
        self.therapist_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Therapist not found".into()))
    }

    fn authorize(&self, actor: Option<&Actor>, therapist: &Therapist) -> Result<(), AppError> {
        if let Some(actor) = actor
            && !policy::can_mutate_booking(actor, therapist)
        {
            return Err(AppError::Forbidden(
                "Only the owning therapist or an admin may modify this booking".into(),
            ));
        }
        Ok(())
    }
}
