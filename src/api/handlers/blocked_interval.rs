use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Duration;
use std::sync::Arc;

use crate::api::dtos::requests::CreateBlockedIntervalRequest;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::blocked_interval::BlockedInterval;
use crate::domain::models::therapist::Therapist;
use crate::domain::services::policy::{self, Actor};
use crate::domain::services::slots;
use crate::error::AppError;
use crate::state::AppState;

async fn owned_therapist(state: &AppState, actor: &Actor, therapist_id: &str) -> Result<Therapist, AppError> {
    let therapist = state
        .therapist_repo
        .find_by_id(therapist_id)
        .await?
        .ok_or(AppError::NotFound("Therapist not found".into()))?;
    if !policy::can_mutate_booking(actor, &therapist) {
        return Err(AppError::Forbidden("Not your calendar".into()));
    }
    Ok(therapist)
}

pub async fn list_blocked_intervals(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(therapist_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    owned_therapist(&state, &actor, &therapist_id).await?;
    let intervals = state.blocked_repo.list_by_therapist(&therapist_id).await?;
    Ok(Json(intervals))
}

pub async fn create_blocked_interval(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(therapist_id): Path<String>,
    Json(payload): Json<CreateBlockedIntervalRequest>,
) -> Result<impl IntoResponse, AppError> {
    let therapist = owned_therapist(&state, &actor, &therapist_id).await?;

    let is_all_day = payload.is_all_day.unwrap_or(false);
    let (start_at, end_at) = if is_all_day {
        // Expand to the full therapist-local calendar day.
        let date = payload
            .date
            .ok_or(AppError::Validation("date is required for all-day blocks".into()))?;
        let tz = slots::parse_timezone(&therapist.timezone)
            .ok_or(AppError::Validation(format!("Unknown timezone: {}", therapist.timezone)))?;
        slots::local_day_bounds(tz, date).ok_or(AppError::Validation("Invalid date".into()))?
    } else {
        let start = payload
            .start_at
            .ok_or(AppError::Validation("start_at is required".into()))?;
        let end = payload
            .end_at
            .ok_or(AppError::Validation("end_at is required".into()))?;
        (start, end)
    };

    if start_at >= end_at {
        return Err(AppError::Validation("start_at must be before end_at".into()));
    }
    if end_at - start_at > Duration::days(366) {
        return Err(AppError::Validation("Blocked interval is too long".into()));
    }

    let interval = BlockedInterval::new(therapist.id, start_at, end_at, payload.reason, is_all_day);
    let created = state.blocked_repo.create(&interval).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn delete_blocked_interval(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(block_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let interval = state
        .blocked_repo
        .find_by_id(&block_id)
        .await?
        .ok_or(AppError::NotFound("Blocked interval not found".into()))?;
    owned_therapist(&state, &actor, &interval.therapist_id).await?;
    state.blocked_repo.delete(&interval.therapist_id, &interval.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
