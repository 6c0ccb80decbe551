use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::domain::models::booking::Booking;
use crate::domain::services::availability::DateAvailability;
use crate::domain::services::slots::Slot;

#[derive(Serialize)]
pub struct DateAvailabilityResponse {
    pub date: String,
    pub has_slots: bool,
}

impl From<DateAvailability> for DateAvailabilityResponse {
    fn from(d: DateAvailability) -> Self {
        Self {
            date: d.date.format("%Y-%m-%d").to_string(),
            has_slots: d.has_slots,
        }
    }
}

/// UTC instants plus ready-to-render local times in the requested zone.
#[derive(Serialize)]
pub struct SlotResponse {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub start_local: String,
    pub end_local: String,
}

impl SlotResponse {
    pub fn from_slot(slot: &Slot, tz: Tz) -> Self {
        Self {
            start: slot.start,
            end: slot.end,
            start_local: slot.start.with_timezone(&tz).format("%H:%M").to_string(),
            end_local: slot.end.with_timezone(&tz).format("%H:%M").to_string(),
        }
    }
}

/// The client-facing view. `management_token` is only handed out at creation
/// and on the management endpoints themselves.
#[derive(Serialize)]
pub struct BookingResponse {
    pub id: String,
    pub reference: String,
    pub therapist_id: String,
    pub session_type_id: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub client_name: String,
    pub client_email: String,
    pub status: String,
    pub meeting_type: String,
    pub meeting_link: Option<String>,
    pub cancel_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub management_token: Option<String>,
}

impl BookingResponse {
    pub fn public(booking: &Booking) -> Self {
        Self::build(booking, false)
    }

    pub fn with_token(booking: &Booking) -> Self {
        Self::build(booking, true)
    }

    fn build(booking: &Booking, include_token: bool) -> Self {
        Self {
            id: booking.id.clone(),
            reference: booking.reference.clone(),
            therapist_id: booking.therapist_id.clone(),
            session_type_id: booking.session_type_id.clone(),
            start_at: booking.start_at,
            end_at: booking.end_at,
            client_name: booking.client_name.clone(),
            client_email: booking.client_email.clone(),
            status: booking.status.as_str().to_string(),
            meeting_type: booking.meeting_type.clone(),
            meeting_link: booking.meeting_link.clone(),
            cancel_reason: booking.cancel_reason.clone(),
            management_token: include_token.then(|| booking.management_token.clone()),
        }
    }
}
