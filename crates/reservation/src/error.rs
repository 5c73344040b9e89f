//! Reservation-side error types.

use chrono::NaiveDate;
use common::ReservationId;
use domain::DomainError;
use messaging::MessagingError;
use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur during reservation-side operations.
#[derive(Debug, Error)]
pub enum ReservationError {
    /// Domain validation or state-transition error.
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Storage error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Messaging error.
    #[error("Messaging error: {0}")]
    Messaging(#[from] MessagingError),

    /// Reservation not found, or not owned by the caller.
    #[error("Reservation not found: {0}")]
    NotFound(ReservationId),

    /// Admission control rejected the booking.
    #[error("Car {car_id} is not available from {start_day} to {end_day}")]
    CarUnavailable {
        car_id: i64,
        start_day: NaiveDate,
        end_day: NaiveDate,
    },

    /// Inventory service error.
    #[error("Inventory service error: {0}")]
    Inventory(String),

    /// The settlement retry loop exhausted its attempts on transient
    /// store failures.
    #[error("Settlement retries exhausted after {attempts} attempts: {reason}")]
    RetriesExhausted { attempts: u32, reason: String },
}

/// Convenience type alias for reservation-side results.
pub type Result<T> = std::result::Result<T, ReservationError>;
