//! PostgreSQL-backed reservation store.

use async_trait::async_trait;
use chrono::NaiveDate;
use common::ReservationId;
use domain::{Reservation, ReservationState};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::{ReservationStore, Result, StoreError};

/// PostgreSQL reservation store.
///
/// Admission atomicity comes from a per-car advisory transaction lock:
/// `insert_if_available` serializes concurrent admissions for the same
/// car, so the overlap check and the insert commit as one unit.
#[derive(Clone)]
pub struct PostgresReservationStore {
    pool: PgPool,
}

impl PostgresReservationStore {
    /// Creates a new PostgreSQL reservation store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the reservations table if it does not exist.
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS reservations (
                id UUID PRIMARY KEY,
                car_id BIGINT NOT NULL,
                user_id TEXT NOT NULL,
                start_day DATE NOT NULL,
                end_day DATE NOT NULL,
                state TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_reservations_car_user \
             ON reservations (car_id, user_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn row_to_reservation(row: PgRow) -> Result<Reservation> {
        let state_str: String = row.try_get("state")?;
        let state = ReservationState::parse(&state_str)
            .ok_or_else(|| StoreError::InvalidState(state_str))?;

        Ok(Reservation {
            id: ReservationId::from_uuid(row.try_get::<Uuid, _>("id")?),
            car_id: row.try_get("car_id")?,
            user_id: row.try_get("user_id")?,
            start_day: row.try_get("start_day")?,
            end_day: row.try_get("end_day")?,
            state,
        })
    }
}

const SELECT_COLUMNS: &str = "id, car_id, user_id, start_day, end_day, state";

#[async_trait]
impl ReservationStore for PostgresReservationStore {
    async fn insert(&self, reservation: Reservation) -> Result<Reservation> {
        sqlx::query(
            r#"
            INSERT INTO reservations (id, car_id, user_id, start_day, end_day, state)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(reservation.id.as_uuid())
        .bind(reservation.car_id)
        .bind(&reservation.user_id)
        .bind(reservation.start_day)
        .bind(reservation.end_day)
        .bind(reservation.state.as_str())
        .execute(&self.pool)
        .await?;

        Ok(reservation)
    }

    async fn insert_if_available(&self, reservation: Reservation) -> Result<Reservation> {
        let mut tx = self.pool.begin().await?;

        // Serialize admissions per car for the duration of the transaction.
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(reservation.car_id)
            .execute(&mut *tx)
            .await?;

        let conflict: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM reservations
                WHERE car_id = $1
                  AND state IN ('Draft', 'Active')
                  AND end_day >= $2
                  AND start_day <= $3
            )
            "#,
        )
        .bind(reservation.car_id)
        .bind(reservation.start_day)
        .bind(reservation.end_day)
        .fetch_one(&mut *tx)
        .await?;

        if conflict {
            return Err(StoreError::OverlapConflict {
                car_id: reservation.car_id,
                start_day: reservation.start_day,
                end_day: reservation.end_day,
            });
        }

        sqlx::query(
            r#"
            INSERT INTO reservations (id, car_id, user_id, start_day, end_day, state)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(reservation.id.as_uuid())
        .bind(reservation.car_id)
        .bind(&reservation.user_id)
        .bind(reservation.start_day)
        .bind(reservation.end_day)
        .bind(reservation.state.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(reservation)
    }

    async fn update_state(&self, id: ReservationId, new_state: ReservationState) -> Result<u64> {
        let result = sqlx::query("UPDATE reservations SET state = $1 WHERE id = $2")
            .bind(new_state.as_str())
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn update_end_day(&self, id: ReservationId, new_end_day: NaiveDate) -> Result<u64> {
        let result = sqlx::query("UPDATE reservations SET end_day = $1 WHERE id = $2")
            .bind(new_end_day)
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn find_by_id(&self, id: ReservationId) -> Result<Option<Reservation>> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM reservations WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_reservation).transpose()
    }

    async fn find_by_car_and_user(
        &self,
        car_id: i64,
        user_id: &str,
    ) -> Result<Option<Reservation>> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM reservations \
             WHERE car_id = $1 AND user_id = $2 LIMIT 1"
        ))
        .bind(car_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_reservation).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Reservation>> {
        let rows = sqlx::query(&format!("SELECT {SELECT_COLUMNS} FROM reservations"))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::row_to_reservation).collect()
    }

    async fn exists_overlapping(
        &self,
        car_id: i64,
        start_day: NaiveDate,
        end_day: NaiveDate,
        exclude: Option<ReservationId>,
    ) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM reservations
                WHERE car_id = $1
                  AND state IN ('Draft', 'Active')
                  AND end_day >= $2
                  AND start_day <= $3
                  AND ($4::uuid IS NULL OR id <> $4)
            )
            "#,
        )
        .bind(car_id)
        .bind(start_day)
        .bind(end_day)
        .bind(exclude.map(|id| id.as_uuid()))
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
