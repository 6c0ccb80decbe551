use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// One-off unavailability (vacation, blocked slot) overriding the
/// recurring rules for an absolute UTC window.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct BlockedInterval {
    pub id: String,
    pub therapist_id: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub reason: Option<String>,
    pub is_all_day: bool,
    pub created_at: DateTime<Utc>,
}

impl BlockedInterval {
    pub fn new(
        therapist_id: String,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
        reason: Option<String>,
        is_all_day: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            therapist_id,
            start_at,
            end_at,
            reason,
            is_all_day,
            created_at: Utc::now(),
        }
    }
}
