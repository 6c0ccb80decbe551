use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::requests::{CreateTherapistRequest, UpdateTherapistRequest};
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::therapist::{NewTherapistParams, Therapist};
use crate::domain::services::{policy, slots};
use crate::error::AppError;
use crate::state::AppState;

fn require_admin(actor: &policy::Actor) -> Result<(), AppError> {
    if !actor.is_admin() {
        return Err(AppError::Forbidden("Admin role required".into()));
    }
    Ok(())
}

fn validate_timezone(name: &str) -> Result<(), AppError> {
    slots::parse_timezone(name)
        .map(|_| ())
        .ok_or(AppError::Validation(format!("Unknown timezone: {}", name)))
}

pub async fn create_therapist(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Json(payload): Json<CreateTherapistRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&actor)?;
    validate_timezone(&payload.timezone)?;
    if payload.slug.trim().is_empty() {
        return Err(AppError::Validation("Slug is required".into()));
    }

    let therapist = Therapist::new(NewTherapistParams {
        user_id: payload.user_id,
        slug: payload.slug,
        name: payload.name,
        email: payload.email,
        timezone: payload.timezone,
        default_session_duration_min: payload.default_session_duration_min.unwrap_or(50),
        buffer_min: payload.buffer_min.unwrap_or(10),
        advance_booking_days: payload.advance_booking_days.unwrap_or(30),
        min_booking_notice_hours: payload.min_booking_notice_hours.unwrap_or(24),
    });

    let created = state.therapist_repo.create(&therapist).await?;
    info!(therapist_id = %created.id, slug = %created.slug, "therapist created");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_therapists(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let therapists = state.therapist_repo.list_active().await?;
    Ok(Json(therapists))
}

pub async fn get_therapist_by_slug(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let therapist = state.availability.find_active_therapist(&slug).await?;
    Ok(Json(therapist))
}

pub async fn update_therapist(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateTherapistRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut therapist = state
        .therapist_repo
        .find_by_id(&id)
        .await?
        .ok_or(AppError::NotFound("Therapist not found".into()))?;
    if !policy::can_mutate_booking(&actor, &therapist) {
        return Err(AppError::Forbidden("Not your profile".into()));
    }

    if let Some(slug) = payload.slug {
        therapist.slug = slug;
    }
    if let Some(name) = payload.name {
        therapist.name = name;
    }
    if let Some(email) = payload.email {
        therapist.email = email;
    }
    if let Some(tz) = payload.timezone {
        validate_timezone(&tz)?;
        therapist.timezone = tz;
    }
    if let Some(v) = payload.default_session_duration_min {
        if v <= 0 {
            return Err(AppError::Validation("Duration must be positive".into()));
        }
        therapist.default_session_duration_min = v;
    }
    if let Some(v) = payload.buffer_min {
        therapist.buffer_min = v.max(0);
    }
    if let Some(v) = payload.advance_booking_days {
        therapist.advance_booking_days = v.max(0);
    }
    if let Some(v) = payload.min_booking_notice_hours {
        therapist.min_booking_notice_hours = v.max(0);
    }
    if let Some(v) = payload.is_active {
        therapist.is_active = v;
    }

    let updated = state.therapist_repo.update(&therapist).await?;
    Ok(Json(updated))
}

/// Soft archive. Existing bookings are untouched; the therapist drops out of
/// public listings and availability.
pub async fn archive_therapist(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&actor)?;
    state.therapist_repo.archive(&id).await?;
    info!(therapist_id = %id, "therapist archived");
    Ok(StatusCode::NO_CONTENT)
}
