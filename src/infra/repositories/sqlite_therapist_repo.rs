use crate::domain::{models::therapist::Therapist, ports::TherapistRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteTherapistRepo {
    pool: SqlitePool,
}

impl SqliteTherapistRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TherapistRepository for SqliteTherapistRepo {
    async fn create(&self, therapist: &Therapist) -> Result<Therapist, AppError> {
        sqlx::query_as::<_, Therapist>(
            "INSERT INTO therapists (id, user_id, slug, name, email, timezone, default_session_duration_min, buffer_min, advance_booking_days, min_booking_notice_hours, is_active, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&therapist.id).bind(&therapist.user_id).bind(&therapist.slug).bind(&therapist.name)
            .bind(&therapist.email).bind(&therapist.timezone).bind(therapist.default_session_duration_min)
            .bind(therapist.buffer_min).bind(therapist.advance_booking_days).bind(therapist.min_booking_notice_hours)
            .bind(therapist.is_active).bind(therapist.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_by_id(&self, id: &str) -> Result<Option<Therapist>, AppError> {
        sqlx::query_as::<_, Therapist>("SELECT * FROM therapists WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Therapist>, AppError> {
        sqlx::query_as::<_, Therapist>("SELECT * FROM therapists WHERE slug = ?").bind(slug).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<Therapist>, AppError> {
        sqlx::query_as::<_, Therapist>("SELECT * FROM therapists WHERE user_id = ?").bind(user_id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_active(&self) -> Result<Vec<Therapist>, AppError> {
        sqlx::query_as::<_, Therapist>("SELECT * FROM therapists WHERE is_active = 1 ORDER BY name ASC").fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn update(&self, therapist: &Therapist) -> Result<Therapist, AppError> {
        sqlx::query_as::<_, Therapist>(
            "UPDATE therapists SET slug=?, name=?, email=?, timezone=?, default_session_duration_min=?, buffer_min=?, advance_booking_days=?, min_booking_notice_hours=?, is_active=? WHERE id=? RETURNING *"
        )
            .bind(&therapist.slug).bind(&therapist.name).bind(&therapist.email).bind(&therapist.timezone)
            .bind(therapist.default_session_duration_min).bind(therapist.buffer_min)
            .bind(therapist.advance_booking_days).bind(therapist.min_booking_notice_hours)
            .bind(therapist.is_active).bind(&therapist.id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
    async fn archive(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE therapists SET is_active = 0 WHERE id = ?").bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Therapist not found".into())); }
        Ok(())
    }
}
