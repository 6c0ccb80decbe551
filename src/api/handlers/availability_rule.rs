use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::api::dtos::requests::AvailabilityRuleRequest;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::availability_rule::AvailabilityRule;
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

fn validate_rule(payload: &AvailabilityRuleRequest) -> Result<(), AppError> {
    if !(0..=6).contains(&payload.day_of_week) {
        return Err(AppError::Validation("day_of_week must be 0 (Sunday) to 6 (Saturday)".into()));
    }
    if payload.start_time >= payload.end_time {
        return Err(AppError::Validation("start_time must be before end_time".into()));
    }
    Ok(())
}

pub async fn list_rules(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(therapist_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    owned_therapist(&state, &actor, &therapist_id).await?;
    let rules = state.rule_repo.list_by_therapist(&therapist_id).await?;
    Ok(Json(rules))
}

pub async fn create_rule(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(therapist_id): Path<String>,
    Json(payload): Json<AvailabilityRuleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let therapist = owned_therapist(&state, &actor, &therapist_id).await?;
    validate_rule(&payload)?;

    let mut rule = AvailabilityRule::new(therapist.id, payload.day_of_week, payload.start_time, payload.end_time);
    if let Some(active) = payload.is_active {
        rule.is_active = active;
    }
    let created = state.rule_repo.create(&rule).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_rule(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(rule_id): Path<String>,
    Json(payload): Json<AvailabilityRuleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut rule = state
        .rule_repo
        .find_by_id(&rule_id)
        .await?
        .ok_or(AppError::NotFound("Availability rule not found".into()))?;
    owned_therapist(&state, &actor, &rule.therapist_id).await?;
    validate_rule(&payload)?;

    rule.day_of_week = payload.day_of_week;
    rule.start_time = payload.start_time;
    rule.end_time = payload.end_time;
    if let Some(active) = payload.is_active {
        rule.is_active = active;
    }
    let updated = state.rule_repo.update(&rule).await?;
    Ok(Json(updated))
}

pub async fn delete_rule(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(rule_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let rule = state
        .rule_repo
        .find_by_id(&rule_id)
        .await?
        .ok_or(AppError::NotFound("Availability rule not found".into()))?;
    owned_therapist(&state, &actor, &rule.therapist_id).await?;
    state.rule_repo.delete(&rule.therapist_id, &rule.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
