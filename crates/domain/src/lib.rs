//! Domain layer for the car-rental reservation system.
//!
//! This crate provides the core domain model shared by both service sides:
//! - Reservation entity and its state machine
//! - Interval overlap checking for admission control
//! - Flat per-day pricing
//! - Explicit validation functions for entities and messages
//! - In-flight message types crossing the service boundary

pub mod error;
pub mod interval;
pub mod messages;
pub mod pricing;
pub mod reservation;
pub mod state;
pub mod validation;

pub use error::DomainError;
pub use interval::overlaps;
pub use messages::{
    Invoice, InvoiceProcessingStatus, ProcessingOutcome, Rental, ReservationSnapshot,
};
pub use pricing::{STANDARD_RATE_PER_DAY, compute_price, rental_days};
pub use reservation::Reservation;
pub use state::ReservationState;
pub use validation::Violation;
