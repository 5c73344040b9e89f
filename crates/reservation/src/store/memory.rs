//! In-memory reservation store for testing and the single-process demo.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use common::ReservationId;
use domain::{Reservation, ReservationState, overlaps};
use tokio::sync::RwLock;

use super::{ReservationStore, Result, StoreError};

/// In-memory reservation store.
///
/// Provides the same interface as the PostgreSQL implementation; a single
/// write lock held across the overlap check and the insert gives
/// [`ReservationStore::insert_if_available`] its atomicity. Transient
/// failures can be injected for retry tests.
#[derive(Clone, Default)]
pub struct InMemoryReservationStore {
    reservations: Arc<RwLock<HashMap<ReservationId, Reservation>>>,
    fail_next: Arc<AtomicU32>,
}

impl InMemoryReservationStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `n` read/write operations fail with a transient error.
    pub fn set_fail_next(&self, n: u32) {
        self.fail_next.store(n, Ordering::SeqCst);
    }

    /// Returns the total number of stored reservations.
    pub async fn reservation_count(&self) -> usize {
        self.reservations.read().await.len()
    }

    fn check_transient(&self) -> Result<()> {
        let remaining = self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .unwrap_or(0);
        if remaining > 0 {
            return Err(StoreError::Unavailable(
                "injected transient failure".to_string(),
            ));
        }
        Ok(())
    }

    fn has_overlap(
        reservations: &HashMap<ReservationId, Reservation>,
        car_id: i64,
        start_day: NaiveDate,
        end_day: NaiveDate,
        exclude: Option<ReservationId>,
    ) -> bool {
        reservations.values().any(|r| {
            r.car_id == car_id
                && Some(r.id) != exclude
                && r.state.blocks_availability()
                && overlaps(r.start_day, r.end_day, start_day, end_day)
        })
    }
}

#[async_trait]
impl ReservationStore for InMemoryReservationStore {
    async fn insert(&self, reservation: Reservation) -> Result<Reservation> {
        self.check_transient()?;
        let mut reservations = self.reservations.write().await;
        reservations.insert(reservation.id, reservation.clone());
        Ok(reservation)
    }

    async fn insert_if_available(&self, reservation: Reservation) -> Result<Reservation> {
        self.check_transient()?;
        let mut reservations = self.reservations.write().await;
        if Self::has_overlap(
            &reservations,
            reservation.car_id,
            reservation.start_day,
            reservation.end_day,
            None,
        ) {
            return Err(StoreError::OverlapConflict {
                car_id: reservation.car_id,
                start_day: reservation.start_day,
                end_day: reservation.end_day,
            });
        }
        reservations.insert(reservation.id, reservation.clone());
        Ok(reservation)
    }

    async fn update_state(&self, id: ReservationId, new_state: ReservationState) -> Result<u64> {
        self.check_transient()?;
        let mut reservations = self.reservations.write().await;
        match reservations.get_mut(&id) {
            Some(reservation) => {
                reservation.state = new_state;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn update_end_day(&self, id: ReservationId, new_end_day: NaiveDate) -> Result<u64> {
        self.check_transient()?;
        let mut reservations = self.reservations.write().await;
        match reservations.get_mut(&id) {
            Some(reservation) => {
                reservation.end_day = new_end_day;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn find_by_id(&self, id: ReservationId) -> Result<Option<Reservation>> {
        self.check_transient()?;
        Ok(self.reservations.read().await.get(&id).cloned())
    }

    async fn find_by_car_and_user(
        &self,
        car_id: i64,
        user_id: &str,
    ) -> Result<Option<Reservation>> {
        self.check_transient()?;
        Ok(self
            .reservations
            .read()
            .await
            .values()
            .find(|r| r.car_id == car_id && r.user_id == user_id)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<Reservation>> {
        self.check_transient()?;
        Ok(self.reservations.read().await.values().cloned().collect())
    }

    async fn exists_overlapping(
        &self,
        car_id: i64,
        start_day: NaiveDate,
        end_day: NaiveDate,
        exclude: Option<ReservationId>,
    ) -> Result<bool> {
        self.check_transient()?;
        let reservations = self.reservations.read().await;
        Ok(Self::has_overlap(
            &reservations,
            car_id,
            start_day,
            end_day,
            exclude,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn reservation(car_id: i64, user: &str, start: NaiveDate, end: NaiveDate) -> Reservation {
        Reservation::new(car_id, user, start, end)
    }

    #[tokio::test]
    async fn insert_and_find_by_id() {
        let store = InMemoryReservationStore::new();
        let r = reservation(42, "alice", day(2025, 6, 1), day(2025, 6, 5));
        let id = r.id;

        store.insert(r.clone()).await.unwrap();
        let found = store.find_by_id(id).await.unwrap();
        assert_eq!(found, Some(r));
    }

    #[tokio::test]
    async fn insert_if_available_rejects_overlap() {
        let store = InMemoryReservationStore::new();
        store
            .insert_if_available(reservation(42, "alice", day(2025, 6, 1), day(2025, 6, 5)))
            .await
            .unwrap();

        let result = store
            .insert_if_available(reservation(42, "bob", day(2025, 6, 3), day(2025, 6, 4)))
            .await;
        assert!(matches!(
            result,
            Err(StoreError::OverlapConflict { car_id: 42, .. })
        ));
        assert_eq!(store.reservation_count().await, 1);
    }

    #[tokio::test]
    async fn insert_if_available_allows_other_car() {
        let store = InMemoryReservationStore::new();
        store
            .insert_if_available(reservation(42, "alice", day(2025, 6, 1), day(2025, 6, 5)))
            .await
            .unwrap();
        store
            .insert_if_available(reservation(43, "bob", day(2025, 6, 3), day(2025, 6, 4)))
            .await
            .unwrap();
        assert_eq!(store.reservation_count().await, 2);
    }

    #[tokio::test]
    async fn declined_reservation_does_not_block_insert() {
        let store = InMemoryReservationStore::new();
        let mut r = reservation(42, "alice", day(2025, 6, 1), day(2025, 6, 5));
        r.state = ReservationState::Declined;
        store.insert(r).await.unwrap();

        store
            .insert_if_available(reservation(42, "bob", day(2025, 6, 3), day(2025, 6, 4)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn update_state_returns_rows_affected() {
        let store = InMemoryReservationStore::new();
        let r = reservation(42, "alice", day(2025, 6, 1), day(2025, 6, 5));
        let id = r.id;
        store.insert(r).await.unwrap();

        assert_eq!(
            store.update_state(id, ReservationState::Active).await.unwrap(),
            1
        );
        assert_eq!(
            store
                .update_state(ReservationId::new(), ReservationState::Active)
                .await
                .unwrap(),
            0
        );

        let found = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.state, ReservationState::Active);
    }

    #[tokio::test]
    async fn exists_overlapping_respects_exclusion() {
        let store = InMemoryReservationStore::new();
        let r = reservation(42, "alice", day(2025, 6, 1), day(2025, 6, 5));
        let id = r.id;
        store.insert(r).await.unwrap();

        assert!(
            store
                .exists_overlapping(42, day(2025, 6, 5), day(2025, 6, 6), None)
                .await
                .unwrap()
        );
        assert!(
            !store
                .exists_overlapping(42, day(2025, 6, 5), day(2025, 6, 6), Some(id))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn injected_failures_expire() {
        let store = InMemoryReservationStore::new();
        store.set_fail_next(2);

        assert!(store.list_all().await.is_err());
        assert!(store.list_all().await.is_err());
        assert!(store.list_all().await.is_ok());
    }
}
