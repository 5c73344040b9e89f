//! Rental creation.

use chrono::{NaiveDate, Utc};
use common::{RentalId, ReservationId};
use domain::Rental;

use crate::error::RentalError;
use crate::store::RentalStore;

/// Creates and queries rental records.
pub struct RentalService<R: RentalStore> {
    store: R,
}

impl<R: RentalStore> RentalService<R> {
    /// Creates a new rental service over the given store.
    pub fn new(store: R) -> Self {
        Self { store }
    }

    /// Creates a rental for an accepted invoice.
    ///
    /// Redelivered invoices are tolerated: when a rental already exists
    /// for the same user and reservation it is returned instead of
    /// creating a second record. A rental whose start date has arrived
    /// is created already active.
    #[tracing::instrument(skip(self), fields(user_id, %reservation_id))]
    pub async fn create_rental(
        &self,
        user_id: &str,
        reservation_id: ReservationId,
        car_id: i64,
        start_date: NaiveDate,
    ) -> Result<Rental, RentalError> {
        if let Some(existing) = self
            .store
            .find_by_user_and_reservation(user_id, reservation_id)
            .await?
        {
            tracing::info!(rental_id = %existing.id, "rental already exists; returning it");
            return Ok(existing);
        }

        let rental = Rental {
            id: RentalId::new(),
            user_id: user_id.to_string(),
            reservation_id,
            car_id,
            start_date,
            active: start_date <= today(),
        };
        let rental = self.store.create(rental).await?;
        metrics::counter!("rentals_created_total").increment(1);
        tracing::info!(%rental, "created rental");
        Ok(rental)
    }

    /// Lists rentals that have already begun.
    pub async fn list_active(&self) -> Result<Vec<Rental>, RentalError> {
        Ok(self.store.list_active().await?)
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
