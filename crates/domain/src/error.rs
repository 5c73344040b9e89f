//! Domain error types.

use thiserror::Error;

use crate::state::ReservationState;
use crate::validation::{Violation, format_violations};

/// Errors that can occur during domain operations.
///
/// Validation failures fail fast with no side effect; state-transition
/// failures leave the reservation unchanged and map to a 4xx-equivalent
/// at the HTTP surface.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Explicit validation rejected the entity or message.
    #[error("Validation failed: {}", format_violations(violations))]
    Validation { violations: Vec<Violation> },

    /// The requested operation is not a legal transition from the
    /// reservation's current state.
    #[error("Cannot {action} reservation in state: {state}")]
    InvalidStateTransition {
        action: &'static str,
        state: ReservationState,
    },

    /// Cancelling an already-declined reservation.
    #[error("Reservation is already cancelled")]
    AlreadyCancelled,

    /// Cancelling a finished reservation.
    #[error("Cannot cancel finished reservation")]
    CannotCancelFinished,

    /// Extending a reservation whose end day is already in the past.
    #[error("Cannot extend expired reservation")]
    ExtendExpired,
}

impl DomainError {
    /// Builds a validation error from a non-empty violation list.
    pub fn validation(violations: Vec<Violation>) -> Self {
        DomainError::Validation { violations }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_formats_violations() {
        let err = DomainError::validation(vec![
            Violation::new("price", "Price must be positive"),
            Violation::new("car_id", "Car ID must be positive"),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("price: Price must be positive"));
        assert!(msg.contains("car_id: Car ID must be positive"));
    }

    #[test]
    fn transition_error_names_state() {
        let err = DomainError::InvalidStateTransition {
            action: "extend",
            state: ReservationState::Declined,
        };
        assert_eq!(
            err.to_string(),
            "Cannot extend reservation in state: Declined"
        );
    }
}
