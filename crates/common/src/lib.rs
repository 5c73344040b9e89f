//! Shared types for the car-rental reservation system.
//!
//! Both service sides (reservation and billing/rental) depend on this crate
//! for the identifier newtypes that cross the service boundary.

pub mod types;

pub use types::{RentalId, ReservationId};
