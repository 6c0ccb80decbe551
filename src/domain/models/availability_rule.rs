use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Recurring weekly capacity: a wall-clock window on one weekday,
/// interpreted in the therapist's timezone at query time.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct AvailabilityRule {
    pub id: String,
    pub therapist_id: String,
    /// 0 = Sunday .. 6 = Saturday.
    pub day_of_week: i32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl AvailabilityRule {
    pub fn new(therapist_id: String, day_of_week: i32, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            therapist_id,
            day_of_week,
            start_time,
            end_time,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}
