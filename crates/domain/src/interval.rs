//! Closed-interval overlap checking for reservation date ranges.

use chrono::NaiveDate;

/// Returns true if the two closed date intervals overlap.
///
/// Touching endpoints count as overlapping (inclusive semantics), so a
/// reservation ending on the day another one starts still conflicts. A
/// single-day interval (`start == end`) behaves like any other interval.
///
/// Pure and total: no error cases, symmetric in its two intervals.
pub fn overlaps(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    !(a_end < b_start || a_start > b_end)
}
