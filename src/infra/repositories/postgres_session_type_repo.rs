use crate::domain::{models::session_type::SessionType, ports::SessionTypeRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresSessionTypeRepo {
    pool: PgPool,
}

impl PostgresSessionTypeRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionTypeRepository for PostgresSessionTypeRepo {
    async fn create(&self, session_type: &SessionType) -> Result<SessionType, AppError> {
        sqlx::query_as::<_, SessionType>(
            "INSERT INTO session_types (id, therapist_id, name, duration_min, meeting_type, price_cents, color, is_active, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING *"
        )
            .bind(&session_type.id).bind(&session_type.therapist_id).bind(&session_type.name)
            .bind(session_type.duration_min).bind(&session_type.meeting_type).bind(session_type.price_cents)
            .bind(&session_type.color).bind(session_type.is_active).bind(session_type.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_by_id(&self, id: &str) -> Result<Option<SessionType>, AppError> {
        sqlx::query_as::<_, SessionType>("SELECT * FROM session_types WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_by_therapist(&self, therapist_id: &str) -> Result<Vec<SessionType>, AppError> {
        sqlx::query_as::<_, SessionType>("SELECT * FROM session_types WHERE therapist_id = $1 AND is_active = TRUE ORDER BY name ASC").bind(therapist_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn update(&self, session_type: &SessionType) -> Result<SessionType, AppError> {
        sqlx::query_as::<_, SessionType>(
            "UPDATE session_types SET name=$1, duration_min=$2, meeting_type=$3, price_cents=$4, color=$5, is_active=$6 WHERE id=$7 AND therapist_id=$8 RETURNING *"
        )
            .bind(&session_type.name).bind(session_type.duration_min).bind(&session_type.meeting_type)
            .bind(session_type.price_cents).bind(&session_type.color).bind(session_type.is_active)
            .bind(&session_type.id).bind(&session_type.therapist_id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
    async fn delete(&self, therapist_id: &str, id: &str) -> Result<(), AppError> {
        // Soft delete: historical bookings keep referencing the row.
        let result = sqlx::query("UPDATE session_types SET is_active = FALSE WHERE id = $1 AND therapist_id = $2").bind(id).bind(therapist_id).execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Session type not found".into())); }
        Ok(())
    }
}
