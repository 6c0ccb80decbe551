use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::api::dtos::requests::{CancelBookingRequest, RescheduleBookingRequest};
use crate::api::dtos::responses::BookingResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Client self-service. Possession of the management token is the
/// authorization; no account is involved.
pub async fn get_booking_by_token(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state
        .booking_repo
        .find_by_management_token(&token)
        .await?
        .ok_or(AppError::NotFound("Booking not found".into()))?;
    Ok(Json(BookingResponse::with_token(&booking)))
}

pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    Json(payload): Json<CancelBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state
        .booking_repo
        .find_by_management_token(&token)
        .await?
        .ok_or(AppError::NotFound("Booking not found".into()))?;
    let cancelled = state.reservation.cancel(&booking.id, &payload.reason, None).await?;
    Ok(Json(BookingResponse::with_token(&cancelled)))
}

pub async fn reschedule_booking(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    Json(payload): Json<RescheduleBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state
        .booking_repo
        .find_by_management_token(&token)
        .await?
        .ok_or(AppError::NotFound("Booking not found".into()))?;
    let updated = state.reservation.reschedule(&booking.id, payload.start, None).await?;
    Ok(Json(BookingResponse::with_token(&updated)))
}
