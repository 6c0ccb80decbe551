use crate::domain::{models::therapist::Therapist, ports::TherapistRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresTherapistRepo {
    pool: PgPool,
}

impl PostgresTherapistRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TherapistRepository for PostgresTherapistRepo {
    async fn create(&self, therapist: &Therapist) -> Result<Therapist, AppError> {
        sqlx::query_as::<_, Therapist>(
            "INSERT INTO therapists (id, user_id, slug, name, email, timezone, default_session_duration_min, buffer_min, advance_booking_days, min_booking_notice_hours, is_active, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING *"
        )
            .bind(&therapist.id).bind(&therapist.user_id).bind(&therapist.slug).bind(&therapist.name)
            .bind(&therapist.email).bind(&therapist.timezone).bind(therapist.default_session_duration_min)
            .bind(therapist.buffer_min).bind(therapist.advance_booking_days).bind(therapist.min_booking_notice_hours)
            .bind(therapist.is_active).bind(therapist.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_by_id(&self, id: &str) -> Result<Option<Therapist>, AppError> {
        sqlx::query_as::<_, Therapist>("SELECT * FROM therapists WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Therapist>, AppError> {
        sqlx::query_as::<_, Therapist>("SELECT * FROM therapists WHERE slug = $1").bind(slug).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<Therapist>, AppError> {
        sqlx::query_as::<_, Therapist>("SELECT * FROM therapists WHERE user_id = $1").bind(user_id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_active(&self) -> Result<Vec<Therapist>, AppError> {
        sqlx::query_as::<_, Therapist>("SELECT * FROM therapists WHERE is_active = TRUE ORDER BY name ASC").fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn update(&self, therapist: &Therapist) -> Result<Therapist, AppError> {
        sqlx::query_as::<_, Therapist>(
            "UPDATE therapists SET slug=$1, name=$2, email=$3, timezone=$4, default_session_duration_min=$5, buffer_min=$6, advance_booking_days=$7, min_booking_notice_hours=$8, is_active=$9 WHERE id=$10 RETURNING *"
        )
            .bind(&therapist.slug).bind(&therapist.name).bind(&therapist.email).bind(&therapist.timezone)
            .bind(therapist.default_session_duration_min).bind(therapist.buffer_min)
            .bind(therapist.advance_booking_days).bind(therapist.min_booking_notice_hours)
            .bind(therapist.is_active).bind(&therapist.id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
    async fn archive(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE therapists SET is_active = FALSE WHERE id = $1").bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Therapist not found".into())); }
        Ok(())
    }
}
