use crate::domain::{models::blocked_interval::BlockedInterval, ports::BlockedIntervalRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub struct PostgresBlockedRepo {
    pool: PgPool,
}

impl PostgresBlockedRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BlockedIntervalRepository for PostgresBlockedRepo {
    async fn create(&self, interval: &BlockedInterval) -> Result<BlockedInterval, AppError> {
        sqlx::query_as::<_, BlockedInterval>(
            "INSERT INTO blocked_intervals (id, therapist_id, start_at, end_at, reason, is_all_day, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *"
        )
            .bind(&interval.id).bind(&interval.therapist_id).bind(interval.start_at).bind(interval.end_at)
            .bind(&interval.reason).bind(interval.is_all_day).bind(interval.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_by_id(&self, id: &str) -> Result<Option<BlockedInterval>, AppError> {
        sqlx::query_as::<_, BlockedInterval>("SELECT * FROM blocked_intervals WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_by_therapist(&self, therapist_id: &str) -> Result<Vec<BlockedInterval>, AppError> {
        sqlx::query_as::<_, BlockedInterval>("SELECT * FROM blocked_intervals WHERE therapist_id = $1 ORDER BY start_at ASC").bind(therapist_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_in_range(&self, therapist_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<BlockedInterval>, AppError> {
        sqlx::query_as::<_, BlockedInterval>("SELECT * FROM blocked_intervals WHERE therapist_id = $1 AND start_at < $2 AND end_at > $3 ORDER BY start_at ASC").bind(therapist_id).bind(end).bind(start).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn delete(&self, therapist_id: &str, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM blocked_intervals WHERE id = $1 AND therapist_id = $2").bind(id).bind(therapist_id).execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Blocked interval not found".into())); }
        Ok(())
    }
}
