//! Storage port for reservations.
//!
//! Every operation is assumed transactional at the scope of a single
//! call. Admission relies on [`ReservationStore::insert_if_available`],
//! which performs the overlap check and the insert atomically so two
//! concurrent admissions cannot both read "available" before either
//! commits.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::NaiveDate;
use common::ReservationId;
use domain::{Reservation, ReservationState};
use thiserror::Error;

pub use memory::InMemoryReservationStore;
pub use postgres::PostgresReservationStore;

/// Errors that can occur when interacting with the reservation store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A transient infrastructure failure; safe to retry.
    #[error("Transient store failure: {0}")]
    Unavailable(String),

    /// The reservation was not found.
    #[error("Reservation not found: {0}")]
    NotFound(ReservationId),

    /// A blocking reservation already overlaps the requested interval.
    #[error("Car {car_id} already has a blocking reservation overlapping {start_day}..{end_day}")]
    OverlapConflict {
        car_id: i64,
        start_day: NaiveDate,
        end_day: NaiveDate,
    },

    /// Storage holds a state value the domain does not recognize.
    #[error("Corrupt reservation state in storage: '{0}'")]
    InvalidState(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Storage collaborator for the reservation side.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Inserts a reservation unconditionally.
    async fn insert(&self, reservation: Reservation) -> Result<Reservation>;

    /// Atomically checks that no blocking reservation overlaps the
    /// interval and inserts; fails with [`StoreError::OverlapConflict`]
    /// when the car is already booked.
    async fn insert_if_available(&self, reservation: Reservation) -> Result<Reservation>;

    /// Updates the state of a reservation, returning the number of rows
    /// affected.
    async fn update_state(&self, id: ReservationId, new_state: ReservationState) -> Result<u64>;

    /// Updates the end day of a reservation, returning the number of rows
    /// affected.
    async fn update_end_day(&self, id: ReservationId, new_end_day: NaiveDate) -> Result<u64>;

    /// Finds a reservation by its ID.
    async fn find_by_id(&self, id: ReservationId) -> Result<Option<Reservation>>;

    /// Finds a reservation by the `(car_id, user_id)` correlation pair.
    ///
    /// Fallback lookup for status messages that predate the explicit
    /// correlation ID; ambiguous when a user holds several reservations
    /// for the same car, in which case an arbitrary one is returned.
    async fn find_by_car_and_user(&self, car_id: i64, user_id: &str)
    -> Result<Option<Reservation>>;

    /// Lists all reservations.
    async fn list_all(&self) -> Result<Vec<Reservation>>;

    /// Returns true if a blocking (Draft or Active) reservation for the
    /// car overlaps the closed interval, excluding the given reservation
    /// (used when re-checking during extend).
    async fn exists_overlapping(
        &self,
        car_id: i64,
        start_day: NaiveDate,
        end_day: NaiveDate,
        exclude: Option<ReservationId>,
    ) -> Result<bool>;
}
