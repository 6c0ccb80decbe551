use std::sync::Arc;
use std::time::Duration;
use chrono_tz::Tz;
use serde_json::json;
use tokio::time::sleep;
use tracing::{error, info, info_span, warn, Instrument};

use crate::domain::models::{booking::Booking, job::Job, therapist::Therapist};
use crate::domain::services::calendar::generate_ics;
use crate::error::AppError;
use crate::state::AppState;

pub async fn start_background_worker(state: Arc<AppState>) {
    info!("Starting background job worker...");

    loop {
        match state.job_repo.find_pending(10).await {
            Ok(jobs) => {
                for job in jobs {
                    let span = info_span!(
                        "background_job",
                        job_id = %job.id,
                        job_type = %job.job_type,
                        booking_id = %job.payload.booking_id
                    );

                    let state = state.clone();

                    async move {
                        info!("Processing job: {}", job.job_type);
                        match process_job(&state, &job).await {
                            Ok(_) => {
                                info!("Job completed successfully");
                                if let Err(e) = state.job_repo.update_status(&job.id, "COMPLETED", None).await {
                                    error!("Failed to mark job as completed: {:?}", e);
                                }
                            }
                            Err(e) => {
                                let err_msg = format!("{}", e);
                                error!("Job failed with error: {}", err_msg);
                                if let Err(up_err) = state.job_repo.update_status(&job.id, "FAILED", Some(err_msg)).await {
                                    error!("Failed to mark job as failed: {:?}", up_err);
                                }
                            }
                        }
                    }
                    .instrument(span)
                    .await;
                }
            }
            Err(e) => error!("Failed to fetch pending jobs: {:?}", e),
        }
        sleep(Duration::from_secs(5)).await;
    }
}

async fn process_job(state: &Arc<AppState>, job: &Job) -> Result<(), AppError> {
    let booking = state
        .booking_repo
        .find_by_id(&job.payload.booking_id)
        .await?
        .ok_or(AppError::NotFound(format!("Booking {} not found", job.payload.booking_id)))?;
    let therapist = state
        .therapist_repo
        .find_by_id(&job.payload.therapist_id)
        .await?
        .ok_or(AppError::NotFound(format!("Therapist {} not found", job.payload.therapist_id)))?;

    match job.job_type.as_str() {
        "CONFIRMATION" => send_confirmation(state, booking, &therapist).await,
        "RESCHEDULE" => send_lifecycle_email(state, &booking, &therapist, "reschedule.html", "Your session was moved", true).await,
        "CANCELLATION" => send_lifecycle_email(state, &booking, &therapist, "cancellation.html", "Your session was cancelled", false).await,
        other => {
            warn!("Unknown job type: {}", other);
            Ok(())
        }
    }
}

/// Confirmation also provisions the video room, so the link lands in the
/// first email the client sees.
async fn send_confirmation(state: &Arc<AppState>, mut booking: Booking, therapist: &Therapist) -> Result<(), AppError> {
    if booking.meeting_type == "video" && booking.meeting_link.is_none() {
        let attendees = vec![booking.client_email.clone(), therapist.email.clone()];
        match state
            .meeting_service
            .create_meeting_link(&booking.id, booking.start_at, booking.end_at, &attendees)
            .await?
        {
            Some(link) => {
                booking.meeting_link = Some(link);
                booking = state.booking_repo.update_state(&booking, vec![]).await?;
            }
            None => warn!("No meeting link available for video booking {}", booking.id),
        }
    }

    send_lifecycle_email(state, &booking, therapist, "confirmation.html", "Your session is booked", true).await
}

async fn send_lifecycle_email(
    state: &Arc<AppState>,
    booking: &Booking,
    therapist: &Therapist,
    template: &str,
    subject: &str,
    attach_ics: bool,
) -> Result<(), AppError> {
    let tz: Tz = therapist
        .timezone
        .parse()
        .map_err(|_| AppError::InternalWithMsg(format!("Invalid therapist timezone: {}", therapist.timezone)))?;
    let start_local = booking.start_at.with_timezone(&tz).format("%A, %e %B %Y at %H:%M").to_string();
    let duration_min = (booking.end_at - booking.start_at).num_minutes();

    let context = tera::Context::from_value(json!({
        "client_name": booking.client_name,
        "therapist_name": therapist.name,
        "start_local": start_local,
        "timezone": therapist.timezone,
        "duration_min": duration_min,
        "meeting_type": booking.meeting_type,
        "meeting_link": booking.meeting_link,
        "reference": booking.reference,
        "cancel_reason": booking.cancel_reason,
        "manage_url": format!("/manage/{}", booking.management_token),
    }))
    .map_err(|e| AppError::InternalWithMsg(format!("Template context error: {:?}", e)))?;

    let html_body = state
        .templates
        .render(template, &context)
        .map_err(|e| AppError::InternalWithMsg(format!("Tera render error: {:?}", e)))?;

    let (attachment_name, ics);
    if attach_ics {
        ics = generate_ics(therapist, booking);
        attachment_name = Some("session.ics");
    } else {
        ics = String::new();
        attachment_name = None;
    }
    let attachment_data = attachment_name.map(|_| ics.as_bytes());

    state
        .email_service
        .send(&booking.client_email, subject, &html_body, attachment_name, attachment_data)
        .await
}
