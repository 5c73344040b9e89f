//! Explicit validation for entities and in-flight messages.
//!
//! Validation is invoked explicitly before any state mutation or publish
//! and returns a structured list of field/message pairs instead of
//! throwing on the first problem.

use crate::messages::{Invoice, InvoiceProcessingStatus, ProcessingOutcome};
use crate::reservation::Reservation;

/// A single validation failure on a named field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: &'static str,
    pub message: String,
}

impl Violation {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Joins violations into a single `field: message, field: message` string.
pub fn format_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(Violation::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Validates a reservation before it is admitted.
pub fn validate_reservation(reservation: &Reservation) -> Vec<Violation> {
    let mut violations = Vec::new();
    if reservation.car_id <= 0 {
        violations.push(Violation::new("car_id", "Car ID must be positive"));
    }
    if reservation.user_id.trim().is_empty() {
        violations.push(Violation::new("user_id", "User ID cannot be blank"));
    }
    if reservation.end_day < reservation.start_day {
        violations.push(Violation::new(
            "end_day",
            "End day cannot be before start day",
        ));
    }
    violations
}

/// Validates an invoice before it is published.
pub fn validate_invoice(invoice: &Invoice) -> Vec<Violation> {
    let mut violations = Vec::new();
    if !(invoice.price > 0.0) || !invoice.price.is_finite() {
        violations.push(Violation::new("price", "Price must be positive"));
    }
    if invoice.reservation.car_id <= 0 {
        violations.push(Violation::new(
            "reservation.car_id",
            "Car ID must be positive",
        ));
    }
    if invoice.reservation.user_id.trim().is_empty() {
        violations.push(Violation::new(
            "reservation.user_id",
            "User ID cannot be blank",
        ));
    }
    if invoice.reservation.end_day < invoice.reservation.start_day {
        violations.push(Violation::new(
            "reservation.end_day",
            "End day cannot be before start day",
        ));
    }
    violations
}

/// Validates an inbound processing-status message before settlement.
pub fn validate_processing_status(status: &InvoiceProcessingStatus) -> Vec<Violation> {
    let mut violations = validate_invoice(&status.invoice)
        .into_iter()
        .map(|v| Violation::new("invoice", v.to_string()))
        .collect::<Vec<_>>();
    if status.outcome == ProcessingOutcome::Ok && status.rental.is_none() {
        violations.push(Violation::new(
            "rental",
            "OK status must carry the created rental",
        ));
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn valid_reservation() -> Reservation {
        Reservation::new(42, "alice", day(2025, 6, 1), day(2025, 6, 5))
    }

    #[test]
    fn valid_reservation_has_no_violations() {
        assert!(validate_reservation(&valid_reservation()).is_empty());
    }

    #[test]
    fn reservation_with_bad_fields_reports_each() {
        let mut r = valid_reservation();
        r.car_id = 0;
        r.user_id = "  ".to_string();
        r.end_day = day(2025, 5, 1);
        let violations = validate_reservation(&r);
        assert_eq!(violations.len(), 3);
        let fields: Vec<_> = violations.iter().map(|v| v.field).collect();
        assert!(fields.contains(&"car_id"));
        assert!(fields.contains(&"user_id"));
        assert!(fields.contains(&"end_day"));
    }

    #[test]
    fn invoice_with_nonpositive_price_is_invalid() {
        let mut invoice = Invoice::for_reservation(&valid_reservation());
        invoice.price = 0.0;
        let violations = validate_invoice(&invoice);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "price");
    }

    #[test]
    fn invoice_with_nan_price_is_invalid() {
        let mut invoice = Invoice::for_reservation(&valid_reservation());
        invoice.price = f64::NAN;
        assert!(!validate_invoice(&invoice).is_empty());
    }

    #[test]
    fn ok_status_without_rental_is_invalid() {
        let invoice = Invoice::for_reservation(&valid_reservation());
        let mut status = InvoiceProcessingStatus::failure(invoice);
        status.outcome = ProcessingOutcome::Ok;
        let violations = validate_processing_status(&status);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "rental");
    }

    #[test]
    fn failure_status_without_rental_is_valid() {
        let invoice = Invoice::for_reservation(&valid_reservation());
        let status = InvoiceProcessingStatus::failure(invoice);
        assert!(validate_processing_status(&status).is_empty());
    }

    #[test]
    fn format_joins_with_commas() {
        let violations = vec![
            Violation::new("a", "first"),
            Violation::new("b", "second"),
        ];
        assert_eq!(format_violations(&violations), "a: first, b: second");
    }
}
