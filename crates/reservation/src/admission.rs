//! Availability checks and admission control.

use std::collections::HashMap;

use chrono::NaiveDate;
use common::ReservationId;

use crate::error::ReservationError;
use crate::inventory::{Car, InventoryClient};
use crate::store::ReservationStore;

/// Admission gate preventing double-booked cars.
///
/// The gate answers availability queries; the admission itself (check +
/// insert in one consistency scope) goes through
/// [`ReservationStore::insert_if_available`] so that two concurrent
/// admissions cannot both observe "available".
pub struct AdmissionGate<S: ReservationStore> {
    store: S,
}

impl<S: ReservationStore> AdmissionGate<S> {
    /// Creates a new admission gate over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns true if the car has no blocking reservation overlapping the
    /// interval. `exclude` skips the reservation's own prior record when
    /// re-checking, e.g. during extend.
    pub async fn is_available(
        &self,
        car_id: i64,
        start_day: NaiveDate,
        end_day: NaiveDate,
        exclude: Option<ReservationId>,
    ) -> Result<bool, ReservationError> {
        Ok(!self
            .store
            .exists_overlapping(car_id, start_day, end_day, exclude)
            .await?)
    }

    /// Lists the cars available over the interval: the full inventory
    /// minus every car referenced by an overlapping Draft/Active
    /// reservation.
    #[tracing::instrument(skip(self, inventory))]
    pub async fn list_available_cars<I: InventoryClient>(
        &self,
        inventory: &I,
        start_day: NaiveDate,
        end_day: NaiveDate,
    ) -> Result<Vec<Car>, ReservationError> {
        let cars = inventory.list_all_cars().await?;
        let reservations = self.store.list_all().await?;

        let mut cars_by_id: HashMap<i64, Car> =
            cars.into_iter().map(|car| (car.id, car)).collect();

        for reservation in &reservations {
            if reservation.is_reserved(start_day, end_day) {
                cars_by_id.remove(&reservation.car_id);
            }
        }

        let mut available: Vec<Car> = cars_by_id.into_values().collect();
        available.sort_by_key(|car| car.id);
        Ok(available)
    }
}
