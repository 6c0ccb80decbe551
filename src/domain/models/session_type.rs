use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

pub const MEETING_TYPES: [&str; 3] = ["in_person", "video", "phone"];

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct SessionType {
    pub id: String,
    pub therapist_id: String,
    pub name: String,
    pub duration_min: i32,
    pub meeting_type: String,
    pub price_cents: Option<i32>,
    pub color: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

pub struct NewSessionTypeParams {
    pub therapist_id: String,
    pub name: String,
    pub duration_min: i32,
    pub meeting_type: String,
    pub price_cents: Option<i32>,
    pub color: String,
}

impl SessionType {
    pub fn new(params: NewSessionTypeParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            therapist_id: params.therapist_id,
            name: params.name,
            duration_min: params.duration_min,
            meeting_type: params.meeting_type,
            price_cents: params.price_cents,
            color: params.color,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}
