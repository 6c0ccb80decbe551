use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::domain::models::therapist::Therapist;
use crate::domain::ports::{
    AvailabilityRuleRepository, BlockedIntervalRepository, BookingRepository, TherapistRepository,
};
use crate::domain::services::slots::{self, Slot, SlotQuery};
use crate::error::AppError;

#[derive(Debug, serde::Serialize)]
pub struct DateAvailability {
    pub date: NaiveDate,
    pub has_slots: bool,
}

/// Read side of the booking funnel: which days have capacity, and which
/// slots a single day offers. Never errors for "no slots".
pub struct AvailabilityService {
    therapist_repo: Arc<dyn TherapistRepository>,
    rule_repo: Arc<dyn AvailabilityRuleRepository>,
    blocked_repo: Arc<dyn BlockedIntervalRepository>,
    booking_repo: Arc<dyn BookingRepository>,
}

impl AvailabilityService {
    pub fn new(
        therapist_repo: Arc<dyn TherapistRepository>,
        rule_repo: Arc<dyn AvailabilityRuleRepository>,
        blocked_repo: Arc<dyn BlockedIntervalRepository>,
        booking_repo: Arc<dyn BookingRepository>,
    ) -> Self {
        Self {
            therapist_repo,
            rule_repo,
            blocked_repo,
            booking_repo,
        }
    }

    /// Active therapist by public slug. Archived and unknown slugs are both
    /// "not found" — distinct from "found but fully booked".
    pub async fn find_active_therapist(&self, slug: &str) -> Result<Therapist, AppError> {
        let therapist = self
            .therapist_repo
            .find_by_slug(slug)
            .await?
            .filter(|t| t.is_active)
            .ok_or(AppError::NotFound("Therapist not found".into()))?;
        Ok(therapist)
    }

    /// Per-day availability over `[today, today + advance_booking_days]` in
    /// the request timezone. Each day short-circuits at the first available
    /// candidate.
    pub async fn available_dates(
        &self,
        slug: &str,
        duration_min: Option<i32>,
        request_tz: Tz,
    ) -> Result<Vec<DateAvailability>, AppError> {
        let therapist = self.find_active_therapist(slug).await?;
        let duration = effective_duration(&therapist, duration_min)?;

        let now = Utc::now();
        let today = now.with_timezone(&request_tz).date_naive();
        let horizon_days = therapist.advance_booking_days.max(0) as i64;
        let last_day = today + Duration::days(horizon_days);

        let rules = self.rule_repo.list_active(&therapist.id).await?;

        // One widened load for the whole horizon; the overlap test inside the
        // generator does the per-day narrowing.
        let (range_start, _) = slots::local_day_bounds(request_tz, today)
            .ok_or(AppError::Validation("Invalid date".into()))?;
        let (_, range_end) = slots::local_day_bounds(request_tz, last_day)
            .ok_or(AppError::Validation("Invalid date".into()))?;
        let blocked = self
            .blocked_repo
            .list_in_range(&therapist.id, range_start - Duration::days(1), range_end + Duration::days(1))
            .await?;
        let bookings = self
            .booking_repo
            .list_occupying_in_range(&therapist.id, range_start - Duration::days(1), range_end + Duration::days(1))
            .await?;

        let mut days = Vec::new();
        let mut date = today;
        while date <= last_day {
            let query = SlotQuery {
                therapist: &therapist,
                rules: &rules,
                blocked: &blocked,
                bookings: &bookings,
                date,
                duration_min: duration,
                request_tz,
                now,
            };
            days.push(DateAvailability {
                date,
                has_slots: slots::first_available(&query).is_some(),
            });
            date += Duration::days(1);
        }

        debug!(
            slug,
            days = days.len(),
            with_slots = days.iter().filter(|d| d.has_slots).count(),
            "computed date availability"
        );
        Ok(days)
    }

    /// All available slots for one request-timezone calendar day, ascending.
    pub async fn slots_for_date(
        &self,
        slug: &str,
        date: NaiveDate,
        duration_min: Option<i32>,
        request_tz: Tz,
    ) -> Result<Vec<Slot>, AppError> {
        let therapist = self.find_active_therapist(slug).await?;
        let duration = effective_duration(&therapist, duration_min)?;

        let candidates = self
            .candidates_for_date(&therapist, date, duration, request_tz, Utc::now(), None)
            .await?;

        Ok(candidates.into_iter().filter(|s| s.available).collect())
    }

    /// Full candidate expansion for one day, optionally excluding a booking
    /// from the conflict set (used when that booking is being moved).
    pub async fn candidates_for_date(
        &self,
        therapist: &Therapist,
        date: NaiveDate,
        duration_min: i32,
        request_tz: Tz,
        now: DateTime<Utc>,
        exclude_booking_id: Option<&str>,
    ) -> Result<Vec<Slot>, AppError> {
        let (range_start, range_end) = slots::local_day_bounds(request_tz, date)
            .ok_or(AppError::Validation("Invalid date".into()))?;

        let rules = self.rule_repo.list_active(&therapist.id).await?;
        let blocked = self
            .blocked_repo
            .list_in_range(&therapist.id, range_start - Duration::days(1), range_end + Duration::days(1))
            .await?;
        let mut bookings = self
            .booking_repo
            .list_occupying_in_range(&therapist.id, range_start - Duration::days(1), range_end + Duration::days(1))
            .await?;
        if let Some(excluded) = exclude_booking_id {
            bookings.retain(|b| b.id != excluded);
        }

        let query = SlotQuery {
            therapist,
            rules: &rules,
            blocked: &blocked,
            bookings: &bookings,
            date,
            duration_min,
            request_tz,
            now,
        };
        Ok(slots::generate_slots(&query))
    }
}

fn effective_duration(therapist: &Therapist, requested: Option<i32>) -> Result<i32, AppError> {
    let duration = requested.unwrap_or(therapist.default_session_duration_min);
    if duration <= 0 {
        return Err(AppError::Validation("Duration must be positive".into()));
    }
    Ok(duration)
}
