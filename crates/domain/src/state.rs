//! Reservation state machine.

use serde::{Deserialize, Serialize};

/// The state of a reservation in its lifecycle.
///
/// State transitions:
/// ```text
/// Draft ──┬──► Active ──► Finished
///         └──► Declined
/// ```
///
/// Settlement drives `Draft → Active` (billing accepted) or
/// `Draft → Declined` (billing rejected). Cancelling moves any
/// non-terminal reservation to `Declined`. `Finished` is reached
/// outside the saga, when a completed rental is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ReservationState {
    /// Reservation has been admitted and is awaiting settlement.
    #[default]
    Draft,

    /// Billing accepted the invoice; the rental is (or will be) underway.
    Active,

    /// Billing rejected the invoice, or the reservation was cancelled.
    Declined,

    /// The rental completed (terminal state).
    Finished,
}

impl ReservationState {
    /// Returns true if the reservation still blocks availability of its car.
    pub fn blocks_availability(&self) -> bool {
        matches!(self, ReservationState::Draft | ReservationState::Active)
    }

    /// Returns true if the reservation can be extended by another day.
    pub fn can_extend(&self) -> bool {
        matches!(self, ReservationState::Draft | ReservationState::Active)
    }

    /// Returns true if the reservation can still be settled by a
    /// processing-status message.
    pub fn can_settle(&self) -> bool {
        matches!(self, ReservationState::Draft)
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReservationState::Declined | ReservationState::Finished)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationState::Draft => "Draft",
            ReservationState::Active => "Active",
            ReservationState::Declined => "Declined",
            ReservationState::Finished => "Finished",
        }
    }

    /// Parses a state from its string name, as stored in the database.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Draft" => Some(ReservationState::Draft),
            "Active" => Some(ReservationState::Active),
            "Declined" => Some(ReservationState::Declined),
            "Finished" => Some(ReservationState::Finished),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReservationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
