use chrono::NaiveTime;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct CreateTherapistRequest {
    pub user_id: String,
    pub slug: String,
    pub name: String,
    pub email: String,
    pub timezone: String,
    pub default_session_duration_min: Option<i32>,
    pub buffer_min: Option<i32>,
    pub advance_booking_days: Option<i32>,
    pub min_booking_notice_hours: Option<i32>,
}

#[derive(Deserialize)]
pub struct UpdateTherapistRequest {
    pub slug: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub timezone: Option<String>,
    pub default_session_duration_min: Option<i32>,
    pub buffer_min: Option<i32>,
    pub advance_booking_days: Option<i32>,
    pub min_booking_notice_hours: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize)]
pub struct AvailabilityRuleRequest {
    /// 0 = Sunday .. 6 = Saturday.
    pub day_of_week: i32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_active: Option<bool>,
}

#[derive(Deserialize)]
pub struct CreateBlockedIntervalRequest {
    /// RFC 3339 instants; ignored when `is_all_day` is set.
    pub start_at: Option<chrono::DateTime<chrono::Utc>>,
    pub end_at: Option<chrono::DateTime<chrono::Utc>>,
    /// Blocks the whole therapist-local calendar day named by `date`.
    pub is_all_day: Option<bool>,
    pub date: Option<chrono::NaiveDate>,
    pub reason: Option<String>,
}

#[derive(Deserialize)]
pub struct SessionTypeRequest {
    pub name: String,
    pub duration_min: i32,
    pub meeting_type: String,
    pub price_cents: Option<i32>,
    pub color: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize)]
pub struct AvailabilityQuery {
    /// IANA timezone the calendar is rendered in. Defaults to the
    /// therapist's own zone.
    pub timezone: Option<String>,
    pub duration: Option<i32>,
    /// Optional narrowing of the returned window.
    pub start: Option<chrono::NaiveDate>,
    pub end: Option<chrono::NaiveDate>,
}

#[derive(Deserialize)]
pub struct SlotsQuery {
    pub date: chrono::NaiveDate,
    pub timezone: Option<String>,
    pub duration: Option<i32>,
}

#[derive(Deserialize)]
pub struct BookingListQuery {
    /// Required for admins; therapists default to their own calendar.
    pub therapist_id: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub start: chrono::DateTime<chrono::Utc>,
    pub session_type_id: Option<String>,
    pub duration_min: Option<i32>,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: Option<String>,
    pub notes: Option<String>,
    pub meeting_type: Option<String>,
}

#[derive(Deserialize)]
pub struct RescheduleBookingRequest {
    pub start: chrono::DateTime<chrono::Utc>,
}

#[derive(Deserialize)]
pub struct CancelBookingRequest {
    pub reason: String,
}

#[derive(Deserialize)]
pub struct BookingStatusRequest {
    /// "confirmed", "completed" or "no_show". Cancellation has its own
    /// endpoint because it requires a reason.
    pub status: String,
}
