//! The reservation entity.

use chrono::NaiveDate;
use common::ReservationId;
use serde::{Deserialize, Serialize};

use crate::interval::overlaps;
use crate::state::ReservationState;

/// A car-rental reservation owned by the reservation side.
///
/// Created in `Draft` after passing admission control; mutated only by
/// legal state transitions; never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub car_id: i64,
    pub user_id: String,
    pub start_day: NaiveDate,
    pub end_day: NaiveDate,
    pub state: ReservationState,
}

impl Reservation {
    /// Creates a new draft reservation with a fresh ID.
    pub fn new(
        car_id: i64,
        user_id: impl Into<String>,
        start_day: NaiveDate,
        end_day: NaiveDate,
    ) -> Self {
        Self {
            id: ReservationId::new(),
            car_id,
            user_id: user_id.into(),
            start_day,
            end_day,
            state: ReservationState::Draft,
        }
    }

    /// Returns true if the given date range conflicts with this reservation,
    /// i.e. the reservation still blocks availability and its interval
    /// overlaps the queried one.
    pub fn is_reserved(&self, start_day: NaiveDate, end_day: NaiveDate) -> bool {
        self.state.blocks_availability()
            && overlaps(self.start_day, self.end_day, start_day, end_day)
    }
}

impl std::fmt::Display for Reservation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Reservation{{id={}, car_id={}, user_id='{}', start_day={}, end_day={}, state={}}}",
            self.id, self.car_id, self.user_id, self.start_day, self.end_day, self.state
        )
    }
}
