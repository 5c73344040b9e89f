//! Flat per-day invoice pricing.

use chrono::NaiveDate;

/// The flat daily rental rate applied to every invoice.
pub const STANDARD_RATE_PER_DAY: f64 = 50.0;

/// Returns the inclusive day span of a reservation.
///
/// A single-day reservation (`start == end`) counts as exactly one day.
pub fn rental_days(start_day: NaiveDate, end_day: NaiveDate) -> i64 {
    (end_day - start_day).num_days() + 1
}

/// Computes the invoice price for a reservation interval.
///
/// Deterministic: the same interval always yields the same price.
pub fn compute_price(start_day: NaiveDate, end_day: NaiveDate) -> f64 {
    rental_days(start_day, end_day) as f64 * STANDARD_RATE_PER_DAY
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn single_day_prices_as_one_day() {
        let d = day(2025, 6, 1);
        assert_eq!(rental_days(d, d), 1);
        assert_eq!(compute_price(d, d), STANDARD_RATE_PER_DAY);
    }

    #[test]
    fn five_day_span_prices_five_days() {
        let price = compute_price(day(2025, 6, 1), day(2025, 6, 5));
        assert_eq!(price, 5.0 * STANDARD_RATE_PER_DAY);
    }

    #[test]
    fn price_is_deterministic() {
        let start = day(2025, 6, 1);
        let end = day(2025, 6, 5);
        assert_eq!(compute_price(start, end), compute_price(start, end));
    }

    #[test]
    fn span_crosses_month_boundary() {
        assert_eq!(rental_days(day(2025, 6, 29), day(2025, 7, 2)), 4);
    }
}
