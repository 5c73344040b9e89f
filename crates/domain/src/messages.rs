//! In-flight message types crossing the service boundary.
//!
//! These are ephemeral: they exist only on the `invoices` and
//! `invoice-processing-status` channels and are never persisted by the
//! reservation side. Every message carries the originating reservation's
//! ID as an immutable correlation key, so settlement can match a status
//! back to its reservation even when a user holds several reservations
//! for the same car.

use chrono::NaiveDate;
use common::{RentalId, ReservationId};
use serde::{Deserialize, Serialize};

use crate::pricing::compute_price;
use crate::reservation::Reservation;

/// Snapshot of a reservation embedded in an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationSnapshot {
    pub car_id: i64,
    pub user_id: String,
    pub start_day: NaiveDate,
    pub end_day: NaiveDate,
}

impl From<&Reservation> for ReservationSnapshot {
    fn from(reservation: &Reservation) -> Self {
        Self {
            car_id: reservation.car_id,
            user_id: reservation.user_id.clone(),
            start_day: reservation.start_day,
            end_day: reservation.end_day,
        }
    }
}

/// A priced invoice for an admitted reservation.
///
/// Produced by the invoice emitter, consumed by the billing processor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// Correlation key: the ID of the originating reservation.
    pub correlation_id: ReservationId,
    pub reservation: ReservationSnapshot,
    pub price: f64,
}

impl Invoice {
    /// Builds an invoice for a reservation at the standard daily rate.
    pub fn for_reservation(reservation: &Reservation) -> Self {
        Self {
            correlation_id: reservation.id,
            reservation: ReservationSnapshot::from(reservation),
            price: compute_price(reservation.start_day, reservation.end_day),
        }
    }
}

impl std::fmt::Display for Invoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Invoice{{correlation_id={}, car_id={}, user_id='{}', price={}}}",
            self.correlation_id, self.reservation.car_id, self.reservation.user_id, self.price
        )
    }
}

/// A rental record created on the billing side for an accepted invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rental {
    pub id: RentalId,
    pub user_id: String,
    pub reservation_id: ReservationId,
    pub car_id: i64,
    pub start_date: NaiveDate,
    /// True iff the rental has already begun (start date is today or earlier).
    pub active: bool,
}

impl std::fmt::Display for Rental {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Rental{{id={}, user_id='{}', reservation_id={}, car_id={}, start_date={}, active={}}}",
            self.id, self.user_id, self.reservation_id, self.car_id, self.start_date, self.active
        )
    }
}

/// Outcome of processing an invoice on the billing side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessingOutcome {
    /// A rental was created; the reservation should become active.
    Ok,
    /// Rental creation failed; the reservation should be declined.
    Failure,
}

impl std::fmt::Display for ProcessingOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingOutcome::Ok => write!(f, "OK"),
            ProcessingOutcome::Failure => write!(f, "FAILURE"),
        }
    }
}

/// Processing status for a previously emitted invoice.
///
/// Produced by the billing processor, consumed by the settlement consumer.
/// Carries the original invoice so the reservation side can correlate the
/// outcome back to the reservation that triggered it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceProcessingStatus {
    /// The rental created on success; absent on failure.
    pub rental: Option<Rental>,
    /// The invoice this status responds to.
    pub invoice: Invoice,
    pub outcome: ProcessingOutcome,
}

impl InvoiceProcessingStatus {
    /// Builds an `OK` status carrying the created rental.
    pub fn ok(invoice: Invoice, rental: Rental) -> Self {
        Self {
            rental: Some(rental),
            invoice,
            outcome: ProcessingOutcome::Ok,
        }
    }

    /// Builds a `FAILURE` status with no rental payload.
    pub fn failure(invoice: Invoice) -> Self {
        Self {
            rental: None,
            invoice,
            outcome: ProcessingOutcome::Failure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::STANDARD_RATE_PER_DAY;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn invoice_for_reservation_prices_inclusive_span() {
        let r = Reservation::new(42, "alice", day(2025, 6, 1), day(2025, 6, 5));
        let invoice = Invoice::for_reservation(&r);
        assert_eq!(invoice.correlation_id, r.id);
        assert_eq!(invoice.price, 5.0 * STANDARD_RATE_PER_DAY);
        assert_eq!(invoice.reservation.car_id, 42);
    }

    #[test]
    fn outcome_serializes_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&ProcessingOutcome::Ok).unwrap(),
            "\"OK\""
        );
        assert_eq!(
            serde_json::to_string(&ProcessingOutcome::Failure).unwrap(),
            "\"FAILURE\""
        );
    }

    #[test]
    fn status_constructors_set_outcome() {
        let r = Reservation::new(7, "bob", day(2025, 6, 1), day(2025, 6, 2));
        let invoice = Invoice::for_reservation(&r);

        let failed = InvoiceProcessingStatus::failure(invoice.clone());
        assert_eq!(failed.outcome, ProcessingOutcome::Failure);
        assert!(failed.rental.is_none());

        let rental = Rental {
            id: RentalId::new(),
            user_id: "bob".to_string(),
            reservation_id: r.id,
            car_id: 7,
            start_date: r.start_day,
            active: false,
        };
        let ok = InvoiceProcessingStatus::ok(invoice, rental);
        assert_eq!(ok.outcome, ProcessingOutcome::Ok);
        assert!(ok.rental.is_some());
    }

    #[test]
    fn status_serialization_roundtrip() {
        let r = Reservation::new(7, "bob", day(2025, 6, 1), day(2025, 6, 2));
        let status = InvoiceProcessingStatus::failure(Invoice::for_reservation(&r));
        let json = serde_json::to_string(&status).unwrap();
        let deserialized: InvoiceProcessingStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(status, deserialized);
    }
}
