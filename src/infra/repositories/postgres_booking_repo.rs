use crate::domain::{models::{booking::Booking, job::Job}, ports::BookingRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Row, Transaction};

pub struct PostgresBookingRepo {
    pool: PgPool,
}

impl PostgresBookingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Serializes concurrent reservations for one therapist. The lock is
    /// released automatically at commit or rollback. The exclusion constraint
    /// on bookings remains as a backstop and surfaces as 23P01.
    async fn lock_therapist(tx: &mut Transaction<'_, Postgres>, therapist_id: &str) -> Result<(), AppError> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(therapist_id)
            .execute(&mut **tx)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    async fn count_overlap(
        tx: &mut Transaction<'_, Postgres>,
        therapist_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_id: Option<&str>,
    ) -> Result<i64, AppError> {
        let row = match exclude_id {
            Some(id) => sqlx::query("SELECT COUNT(*) as count FROM bookings WHERE therapist_id = $1 AND start_at < $2 AND end_at > $3 AND status IN ('pending', 'confirmed') AND id != $4")
                .bind(therapist_id).bind(end).bind(start).bind(id)
                .fetch_one(&mut **tx).await.map_err(AppError::Database)?,
            None => sqlx::query("SELECT COUNT(*) as count FROM bookings WHERE therapist_id = $1 AND start_at < $2 AND end_at > $3 AND status IN ('pending', 'confirmed')")
                .bind(therapist_id).bind(end).bind(start)
                .fetch_one(&mut **tx).await.map_err(AppError::Database)?,
        };
        Ok(row.get::<i64, _>("count"))
    }

    async fn insert_jobs(tx: &mut Transaction<'_, Postgres>, jobs: Vec<Job>) -> Result<(), AppError> {
        for job in jobs {
            sqlx::query("INSERT INTO jobs (id, job_type, payload, execute_at, status, error_message, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7)")
                .bind(&job.id).bind(&job.job_type).bind(&job.payload).bind(job.execute_at)
                .bind(&job.status).bind(&job.error_message).bind(job.created_at)
                .execute(&mut **tx).await.map_err(AppError::Database)?;
        }
        Ok(())
    }
}

#[async_trait]
impl BookingRepository for PostgresBookingRepo {
    async fn create_reserved(&self, booking: &Booking, jobs: Vec<Job>) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        Self::lock_therapist(&mut tx, &booking.therapist_id).await?;

        let overlapping = Self::count_overlap(&mut tx, &booking.therapist_id, booking.start_at, booking.end_at, None).await?;
        if overlapping > 0 {
            return Err(AppError::SlotConflict("Someone just booked that slot. Please pick another one.".into()));
        }

        let created = sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (id, therapist_id, session_type_id, start_at, end_at, client_name, client_email, client_phone, notes, status, meeting_type, meeting_link, reference, management_token, cancel_reason, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
             RETURNING *"
        )
            .bind(&booking.id).bind(&booking.therapist_id).bind(&booking.session_type_id)
            .bind(booking.start_at).bind(booking.end_at).bind(&booking.client_name)
            .bind(&booking.client_email).bind(&booking.client_phone).bind(&booking.notes)
            .bind(booking.status.as_str()).bind(&booking.meeting_type).bind(&booking.meeting_link)
            .bind(&booking.reference).bind(&booking.management_token).bind(&booking.cancel_reason)
            .bind(booking.created_at)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        Self::insert_jobs(&mut tx, jobs).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn reschedule_reserved(&self, booking: &Booking, new_start: DateTime<Utc>, new_end: DateTime<Utc>, jobs: Vec<Job>) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        Self::lock_therapist(&mut tx, &booking.therapist_id).await?;

        let overlapping = Self::count_overlap(&mut tx, &booking.therapist_id, new_start, new_end, Some(&booking.id)).await?;
        if overlapping > 0 {
            return Err(AppError::SlotConflict("Someone just booked that slot. Please pick another one.".into()));
        }

        let updated = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET start_at = $1, end_at = $2 WHERE id = $3 AND therapist_id = $4 RETURNING *"
        )
            .bind(new_start).bind(new_end).bind(&booking.id).bind(&booking.therapist_id)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        Self::insert_jobs(&mut tx, jobs).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(updated)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_by_reference(&self, reference: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE reference = $1").bind(reference).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_by_management_token(&self, token: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE management_token = $1").bind(token).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_by_therapist(&self, therapist_id: &str) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE therapist_id = $1 ORDER BY start_at ASC").bind(therapist_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_occupying_in_range(&self, therapist_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE therapist_id = $1 AND start_at < $2 AND end_at > $3 AND status IN ('pending', 'confirmed') ORDER BY start_at ASC")
            .bind(therapist_id).bind(end).bind(start).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn update_state(&self, booking: &Booking, jobs: Vec<Job>) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let updated = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = $1, cancel_reason = $2, meeting_link = $3 WHERE id = $4 RETURNING *"
        )
            .bind(booking.status.as_str()).bind(&booking.cancel_reason).bind(&booking.meeting_link).bind(&booking.id)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;
        Self::insert_jobs(&mut tx, jobs).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(updated)
    }
}
