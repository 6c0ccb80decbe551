use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Therapist {
    pub id: String,
    /// Subject claim of the owning account at the external identity provider.
    pub user_id: String,
    pub slug: String,
    pub name: String,
    pub email: String,
    /// IANA timezone name; availability rules are wall-clock in this zone.
    pub timezone: String,
    pub default_session_duration_min: i32,
    pub buffer_min: i32,
    pub advance_booking_days: i32,
    pub min_booking_notice_hours: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

pub struct NewTherapistParams {
    pub user_id: String,
    pub slug: String,
    pub name: String,
    pub email: String,
    pub timezone: String,
    pub default_session_duration_min: i32,
    pub buffer_min: i32,
    pub advance_booking_days: i32,
    pub min_booking_notice_hours: i32,
}

impl Therapist {
    pub fn new(params: NewTherapistParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: params.user_id,
            slug: params.slug,
            name: params.name,
            email: params.email,
            timezone: params.timezone,
            default_session_duration_min: params.default_session_duration_min,
            buffer_min: params.buffer_min,
            advance_booking_days: params.advance_booking_days,
            min_booking_notice_hours: params.min_booking_notice_hours,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}
