//! Rental record storage port.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::ReservationId;
use domain::Rental;

/// Errors raised by a rental store backend.
#[derive(Debug, thiserror::Error)]
pub enum RentalStoreError {
    #[error("rental store unavailable: {0}")]
    Unavailable(String),
}

/// Storage port for rental records on the billing side.
#[async_trait]
pub trait RentalStore: Send + Sync {
    /// Persists a rental record.
    async fn create(&self, rental: Rental) -> Result<Rental, RentalStoreError>;

    /// Finds the rental created for a given user and reservation, if any.
    async fn find_by_user_and_reservation(
        &self,
        user_id: &str,
        reservation_id: ReservationId,
    ) -> Result<Option<Rental>, RentalStoreError>;

    /// Lists rentals that have already begun.
    async fn list_active(&self) -> Result<Vec<Rental>, RentalStoreError>;
}

#[derive(Default)]
struct InMemoryRentalState {
    rentals: Vec<Rental>,
    fail_on_create: bool,
}

/// In-memory rental store for testing and the single-process demo.
///
/// Billing failures can be injected to drive the saga's compensation
/// path in tests.
#[derive(Clone, Default)]
pub struct InMemoryRentalStore {
    state: Arc<RwLock<InMemoryRentalState>>,
}

impl InMemoryRentalStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent create call fail until cleared.
    pub fn set_fail_on_create(&self, fail: bool) {
        self.state.write().unwrap().fail_on_create = fail;
    }

    /// Returns the total number of stored rentals.
    pub fn rental_count(&self) -> usize {
        self.state.read().unwrap().rentals.len()
    }
}

#[async_trait]
impl RentalStore for InMemoryRentalStore {
    async fn create(&self, rental: Rental) -> Result<Rental, RentalStoreError> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_create {
            return Err(RentalStoreError::Unavailable(
                "injected create failure".to_string(),
            ));
        }
        state.rentals.push(rental.clone());
        Ok(rental)
    }

    async fn find_by_user_and_reservation(
        &self,
        user_id: &str,
        reservation_id: ReservationId,
    ) -> Result<Option<Rental>, RentalStoreError> {
        Ok(self
            .state
            .read()
            .unwrap()
            .rentals
            .iter()
            .find(|r| r.user_id == user_id && r.reservation_id == reservation_id)
            .cloned())
    }

    async fn list_active(&self) -> Result<Vec<Rental>, RentalStoreError> {
        Ok(self
            .state
            .read()
            .unwrap()
            .rentals
            .iter()
            .filter(|r| r.active)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use common::RentalId;

    fn rental(user: &str, reservation_id: ReservationId, active: bool) -> Rental {
        Rental {
            id: RentalId::new(),
            user_id: user.to_string(),
            reservation_id,
            car_id: 42,
            start_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            active,
        }
    }

    #[tokio::test]
    async fn create_and_find() {
        let store = InMemoryRentalStore::new();
        let reservation_id = ReservationId::new();
        let created = store.create(rental("alice", reservation_id, false)).await.unwrap();

        let found = store
            .find_by_user_and_reservation("alice", reservation_id)
            .await
            .unwrap();
        assert_eq!(found, Some(created));

        let missing = store
            .find_by_user_and_reservation("bob", reservation_id)
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn list_active_filters_pending_rentals() {
        let store = InMemoryRentalStore::new();
        store
            .create(rental("alice", ReservationId::new(), true))
            .await
            .unwrap();
        store
            .create(rental("bob", ReservationId::new(), false))
            .await
            .unwrap();

        let active = store.list_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].user_id, "alice");
    }

    #[tokio::test]
    async fn injected_failure_rejects_create() {
        let store = InMemoryRentalStore::new();
        store.set_fail_on_create(true);
        let result = store.create(rental("alice", ReservationId::new(), false)).await;
        assert!(matches!(result, Err(RentalStoreError::Unavailable(_))));

        store.set_fail_on_create(false);
        assert!(store.create(rental("alice", ReservationId::new(), false)).await.is_ok());
    }
}
