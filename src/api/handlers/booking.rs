use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::api::dtos::requests::{
    BookingListQuery, BookingStatusRequest, CancelBookingRequest, CreateBookingRequest,
    RescheduleBookingRequest,
};
use crate::api::dtos::responses::BookingResponse;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::booking::BookingStatus;
use crate::domain::models::therapist::Therapist;
use crate::domain::services::policy::{self, Actor};
use crate::domain::services::reservation::CreateBookingCommand;
use crate::error::AppError;
use crate::state::AppState;

/// Public self-service booking. The result starts out pending and carries
/// the management token the client needs for later changes.
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let therapist = state.availability.find_active_therapist(&slug).await?;

    let booking = state
        .reservation
        .create(CreateBookingCommand {
            therapist_id: therapist.id,
            session_type_id: payload.session_type_id,
            start: payload.start,
            duration_min: payload.duration_min,
            client_name: payload.client_name,
            client_email: payload.client_email,
            client_phone: payload.client_phone,
            notes: payload.notes,
            meeting_type: payload.meeting_type,
            created_by_staff: false,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(BookingResponse::with_token(&booking))))
}

/// Staff-created bookings skip the pending step.
pub async fn create_booking_as_staff(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(therapist_id): Path<String>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let therapist = state
        .therapist_repo
        .find_by_id(&therapist_id)
        .await?
        .ok_or(AppError::NotFound("Therapist not found".into()))?;
    if !policy::can_mutate_booking(&actor, &therapist) {
        return Err(AppError::Forbidden("Not your calendar".into()));
    }

    let booking = state
        .reservation
        .create(CreateBookingCommand {
            therapist_id: therapist.id,
            session_type_id: payload.session_type_id,
            start: payload.start,
            duration_min: payload.duration_min,
            client_name: payload.client_name,
            client_email: payload.client_email,
            client_phone: payload.client_phone,
            notes: payload.notes,
            meeting_type: payload.meeting_type,
            created_by_staff: true,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(BookingResponse::public(&booking))))
}

async fn resolve_calendar(
    state: &AppState,
    actor: &Actor,
    therapist_id: Option<&str>,
) -> Result<Therapist, AppError> {
    let therapist = match therapist_id {
        Some(id) => state
            .therapist_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Therapist not found".into()))?,
        None => state
            .therapist_repo
            .find_by_user_id(&actor.user_id)
            .await?
            .ok_or(AppError::Validation("therapist_id is required".into()))?,
    };
    if !policy::can_mutate_booking(actor, &therapist) {
        return Err(AppError::Forbidden("Not your calendar".into()));
    }
    Ok(therapist)
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Query(query): Query<BookingListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let therapist = resolve_calendar(&state, &actor, query.therapist_id.as_deref()).await?;
    let bookings = state.booking_repo.list_by_therapist(&therapist.id).await?;
    let response: Vec<BookingResponse> = bookings.iter().map(BookingResponse::public).collect();
    Ok(Json(response))
}

pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state
        .booking_repo
        .find_by_id(&booking_id)
        .await?
        .ok_or(AppError::NotFound("Booking not found".into()))?;
    let therapist = state
        .therapist_repo
        .find_by_id(&booking.therapist_id)
        .await?
        .ok_or(AppError::NotFound("Therapist not found".into()))?;
    if !policy::can_mutate_booking(&actor, &therapist) {
        return Err(AppError::Forbidden("Not your booking".into()));
    }
    Ok(Json(BookingResponse::public(&booking)))
}

pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(booking_id): Path<String>,
    Json(payload): Json<CancelBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let cancelled = state
        .reservation
        .cancel(&booking_id, &payload.reason, Some(&actor))
        .await?;
    Ok(Json(BookingResponse::public(&cancelled)))
}

pub async fn reschedule_booking(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(booking_id): Path<String>,
    Json(payload): Json<RescheduleBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let updated = state
        .reservation
        .reschedule(&booking_id, payload.start, Some(&actor))
        .await?;
    Ok(Json(BookingResponse::public(&updated)))
}

/// confirm / complete / no_show through the status state machine.
pub async fn update_booking_status(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(booking_id): Path<String>,
    Json(payload): Json<BookingStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let next = BookingStatus::parse(&payload.status)
        .ok_or(AppError::Validation(format!("Unknown status: {}", payload.status)))?;
    let updated = state.reservation.transition(&booking_id, next, &actor).await?;
    Ok(Json(BookingResponse::public(&updated)))
}
