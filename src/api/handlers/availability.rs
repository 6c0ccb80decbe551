use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono_tz::Tz;
use std::sync::Arc;

use crate::api::dtos::requests::{AvailabilityQuery, SlotsQuery};
use crate::api::dtos::responses::{DateAvailabilityResponse, SlotResponse};
use crate::domain::services::slots;
use crate::error::AppError;
use crate::state::AppState;

fn resolve_tz(requested: Option<&str>, fallback: &str) -> Result<Tz, AppError> {
    let name = requested.unwrap_or(fallback);
    slots::parse_timezone(name).ok_or(AppError::Validation(format!("Unknown timezone: {}", name)))
}

pub async fn get_available_dates(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<impl IntoResponse, AppError> {
    let therapist = state.availability.find_active_therapist(&slug).await?;
    let tz = resolve_tz(query.timezone.as_deref(), &therapist.timezone)?;

    let days = state.availability.available_dates(&slug, query.duration, tz).await?;

    let response: Vec<DateAvailabilityResponse> = days
        .into_iter()
        .filter(|d| query.start.is_none_or(|s| d.date >= s))
        .filter(|d| query.end.is_none_or(|e| d.date <= e))
        .map(DateAvailabilityResponse::from)
        .collect();
    Ok(Json(response))
}

pub async fn get_slots(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Query(query): Query<SlotsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let therapist = state.availability.find_active_therapist(&slug).await?;
    let tz = resolve_tz(query.timezone.as_deref(), &therapist.timezone)?;

    let slots = state
        .availability
        .slots_for_date(&slug, query.date, query.duration, tz)
        .await?;

    let response: Vec<SlotResponse> = slots.iter().map(|s| SlotResponse::from_slot(s, tz)).collect();
    Ok(Json(response))
}
