use crate::domain::ports::MeetingLinkService;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Requests a video-call room from the configured conferencing provider.
/// Failures are logged and swallowed: a booking without a link is still a
/// valid booking, and the therapist can attach one manually.
pub struct HttpMeetingService {
    client: Client,
    api_url: String,
}

impl HttpMeetingService {
    pub fn new(api_url: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
        }
    }
}

#[derive(Serialize)]
struct MeetingRequest<'a> {
    external_id: &'a str,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
    attendees: &'a [String],
}

#[derive(Deserialize)]
struct MeetingResponse {
    join_url: String,
}

#[async_trait]
impl MeetingLinkService for HttpMeetingService {
    async fn create_meeting_link(
        &self,
        booking_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        attendees: &[String],
    ) -> Result<Option<String>, AppError> {
        let payload = MeetingRequest {
            external_id: booking_id,
            start_at: start,
            end_at: end,
            attendees,
        };

        let res = match self.client.post(&self.api_url).json(&payload).send().await {
            Ok(res) => res,
            Err(e) => {
                warn!("Meeting provider unreachable: {}", e);
                return Ok(None);
            }
        };

        if !res.status().is_success() {
            warn!("Meeting provider returned {}", res.status());
            return Ok(None);
        }

        match res.json::<MeetingResponse>().await {
            Ok(body) => Ok(Some(body.join_url)),
            Err(e) => {
                warn!("Meeting provider sent an unreadable response: {}", e);
                Ok(None)
            }
        }
    }
}

/// Used when no conferencing provider is configured. Video bookings are
/// created without a link.
pub struct NoopMeetingService;

#[async_trait]
impl MeetingLinkService for NoopMeetingService {
    async fn create_meeting_link(
        &self,
        _booking_id: &str,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
        _attendees: &[String],
    ) -> Result<Option<String>, AppError> {
        Ok(None)
    }
}
