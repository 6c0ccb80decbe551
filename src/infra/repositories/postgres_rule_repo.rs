use crate::domain::{models::availability_rule::AvailabilityRule, ports::AvailabilityRuleRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresRuleRepo {
    pool: PgPool,
}

impl PostgresRuleRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AvailabilityRuleRepository for PostgresRuleRepo {
    async fn create(&self, rule: &AvailabilityRule) -> Result<AvailabilityRule, AppError> {
        sqlx::query_as::<_, AvailabilityRule>(
            "INSERT INTO availability_rules (id, therapist_id, day_of_week, start_time, end_time, is_active, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *"
        )
            .bind(&rule.id).bind(&rule.therapist_id).bind(rule.day_of_week)
            .bind(rule.start_time).bind(rule.end_time).bind(rule.is_active).bind(rule.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_by_id(&self, id: &str) -> Result<Option<AvailabilityRule>, AppError> {
        sqlx::query_as::<_, AvailabilityRule>("SELECT * FROM availability_rules WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_by_therapist(&self, therapist_id: &str) -> Result<Vec<AvailabilityRule>, AppError> {
        sqlx::query_as::<_, AvailabilityRule>("SELECT * FROM availability_rules WHERE therapist_id = $1 ORDER BY day_of_week ASC, start_time ASC").bind(therapist_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_active(&self, therapist_id: &str) -> Result<Vec<AvailabilityRule>, AppError> {
        sqlx::query_as::<_, AvailabilityRule>("SELECT * FROM availability_rules WHERE therapist_id = $1 AND is_active = TRUE ORDER BY day_of_week ASC, start_time ASC").bind(therapist_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn update(&self, rule: &AvailabilityRule) -> Result<AvailabilityRule, AppError> {
        sqlx::query_as::<_, AvailabilityRule>(
            "UPDATE availability_rules SET day_of_week=$1, start_time=$2, end_time=$3, is_active=$4 WHERE id=$5 AND therapist_id=$6 RETURNING *"
        )
            .bind(rule.day_of_week).bind(rule.start_time).bind(rule.end_time).bind(rule.is_active)
            .bind(&rule.id).bind(&rule.therapist_id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
    async fn delete(&self, therapist_id: &str, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM availability_rules WHERE id = $1 AND therapist_id = $2").bind(id).bind(therapist_id).execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Availability rule not found".into())); }
        Ok(())
    }
}
