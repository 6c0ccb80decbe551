use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::api::dtos::requests::SessionTypeRequest;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::session_type::{NewSessionTypeParams, SessionType, MEETING_TYPES};
use crate::domain::models::therapist::Therapist;
use crate::domain::services::policy::{self, Actor};
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

fn validate_session_type(payload: &SessionTypeRequest) -> Result<(), AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("Name is required".into()));
    }
    if payload.duration_min <= 0 {
        return Err(AppError::Validation("Duration must be positive".into()));
    }
    if !MEETING_TYPES.contains(&payload.meeting_type.as_str()) {
        return Err(AppError::Validation("Invalid meeting type".into()));
    }
    Ok(())
}

/// Public: the booking page shows a therapist's offerings by slug.
pub async fn list_session_types_public(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let therapist = state.availability.find_active_therapist(&slug).await?;
    let session_types = state.session_type_repo.list_by_therapist(&therapist.id).await?;
    Ok(Json(session_types))
}

pub async fn create_session_type(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(therapist_id): Path<String>,
    Json(payload): Json<SessionTypeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let therapist = owned_therapist(&state, &actor, &therapist_id).await?;
    validate_session_type(&payload)?;

    let mut session_type = SessionType::new(NewSessionTypeParams {
        therapist_id: therapist.id,
        name: payload.name,
        duration_min: payload.duration_min,
        meeting_type: payload.meeting_type,
        price_cents: payload.price_cents,
        color: payload.color.unwrap_or_else(|| "#6b8f71".to_string()),
    });
    if let Some(active) = payload.is_active {
        session_type.is_active = active;
    }
    let created = state.session_type_repo.create(&session_type).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_session_type(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(type_id): Path<String>,
    Json(payload): Json<SessionTypeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut session_type = state
        .session_type_repo
        .find_by_id(&type_id)
        .await?
        .ok_or(AppError::NotFound("Session type not found".into()))?;
    owned_therapist(&state, &actor, &session_type.therapist_id).await?;
    validate_session_type(&payload)?;

    session_type.name = payload.name;
    session_type.duration_min = payload.duration_min;
    session_type.meeting_type = payload.meeting_type;
    session_type.price_cents = payload.price_cents;
    if let Some(color) = payload.color {
        session_type.color = color;
    }
    if let Some(active) = payload.is_active {
        session_type.is_active = active;
    }
    let updated = state.session_type_repo.update(&session_type).await?;
    Ok(Json(updated))
}

pub async fn delete_session_type(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(type_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let session_type = state
        .session_type_repo
        .find_by_id(&type_id)
        .await?
        .ok_or(AppError::NotFound("Session type not found".into()))?;
    owned_therapist(&state, &actor, &session_type.therapist_id).await?;
    state.session_type_repo.delete(&session_type.therapist_id, &session_type.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
