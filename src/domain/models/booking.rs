use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use rand::{distributions::Alphanumeric, Rng};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
    NoShow,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
            BookingStatus::NoShow => "no_show",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "cancelled" => Some(BookingStatus::Cancelled),
            "completed" => Some(BookingStatus::Completed),
            "no_show" => Some(BookingStatus::NoShow),
            _ => None,
        }
    }

    /// A booking in one of these states occupies its interval.
    pub fn occupies_slot(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Cancelled | BookingStatus::Completed | BookingStatus::NoShow)
    }

    /// The full transition table. Everything not listed here is rejected.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Completed)
                | (BookingStatus::Confirmed, BookingStatus::NoShow)
        )
    }
}

impl TryFrom<String> for BookingStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        BookingStatus::parse(&value).ok_or_else(|| format!("unknown booking status: {}", value))
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Booking {
    pub id: String,
    pub therapist_id: String,
    pub session_type_id: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: Option<String>,
    pub notes: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: BookingStatus,
    pub meeting_type: String,
    pub meeting_link: Option<String>,
    /// Human-shareable code quoted in emails and at reception.
    pub reference: String,
    /// Long random token backing the client self-service management link.
    pub management_token: String,
    pub cancel_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct NewBookingParams {
    pub therapist_id: String,
    pub session_type_id: Option<String>,
    pub start: DateTime<Utc>,
    pub duration_min: i32,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: Option<String>,
    pub notes: Option<String>,
    pub meeting_type: String,
    pub status: BookingStatus,
}

impl Booking {
    pub fn new(params: NewBookingParams) -> Self {
        let end_at = params.start + chrono::Duration::minutes(params.duration_min as i64);

        let management_token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(48)
            .map(char::from)
            .collect();

        Self {
            id: Uuid::new_v4().to_string(),
            therapist_id: params.therapist_id,
            session_type_id: params.session_type_id,
            start_at: params.start,
            end_at,
            client_name: params.client_name,
            client_email: params.client_email,
            client_phone: params.client_phone,
            notes: params.notes,
            status: params.status,
            meeting_type: params.meeting_type,
            meeting_link: None,
            reference: generate_reference(),
            management_token,
            cancel_reason: None,
            created_at: Utc::now(),
        }
    }
}

/// Short uppercase code like "BK-7F3KQ2XM". Uniqueness is collision-checked
/// at creation time and backed by a unique index.
pub fn generate_reference() -> String {
    let code: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        .take(8)
        .map(char::from)
        .collect();
    format!("BK-{}", code)
}
