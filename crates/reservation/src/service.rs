//! Reservation lifecycle service.

use chrono::{Duration, NaiveDate, Utc};
use common::ReservationId;
use domain::{DomainError, Invoice, Reservation, ReservationState, validation};
use messaging::MessagePublisher;

use crate::admission::AdmissionGate;
use crate::error::ReservationError;
use crate::inventory::{Car, InventoryClient};
use crate::invoice::InvoiceEmitter;
use crate::store::{ReservationStore, StoreError};

/// User recorded when the caller carries no identity.
pub const ANONYMOUS_USER: &str = "anonymous";

/// Request to make a new reservation.
#[derive(Debug, Clone)]
pub struct MakeReservation {
    pub car_id: i64,
    /// Caller identity; `None` books as [`ANONYMOUS_USER`].
    pub user_id: Option<String>,
    pub start_day: NaiveDate,
    pub end_day: NaiveDate,
}

/// Orchestrates the reservation side of the saga: admission, creation,
/// invoice emission, extension, and cancellation.
pub struct ReservationService<S, I, P>
where
    S: ReservationStore + Clone,
    I: InventoryClient,
    P: MessagePublisher<Invoice>,
{
    store: S,
    gate: AdmissionGate<S>,
    inventory: I,
    emitter: InvoiceEmitter<P>,
}

impl<S, I, P> ReservationService<S, I, P>
where
    S: ReservationStore + Clone,
    I: InventoryClient,
    P: MessagePublisher<Invoice>,
{
    /// Creates a new reservation service.
    pub fn new(store: S, inventory: I, invoice_publisher: P) -> Self {
        let gate = AdmissionGate::new(store.clone());
        Self {
            store,
            gate,
            inventory,
            emitter: InvoiceEmitter::new(invoice_publisher),
        }
    }

    /// Admits and creates a reservation, then emits its invoice.
    ///
    /// The call returns once the invoice publish has been attempted; it
    /// does not wait for the settlement round trip. A publish failure
    /// leaves the created reservation in Draft and is logged for
    /// out-of-band remediation.
    #[tracing::instrument(skip(self, request), fields(car_id = request.car_id))]
    pub async fn make_reservation(
        &self,
        request: MakeReservation,
    ) -> Result<Reservation, ReservationError> {
        let user_id = request
            .user_id
            .unwrap_or_else(|| ANONYMOUS_USER.to_string());
        let reservation =
            Reservation::new(request.car_id, user_id, request.start_day, request.end_day);

        let violations = validation::validate_reservation(&reservation);
        if !violations.is_empty() {
            return Err(DomainError::validation(violations).into());
        }

        let reservation = self
            .store
            .insert_if_available(reservation)
            .await
            .map_err(|error| match error {
                StoreError::OverlapConflict {
                    car_id,
                    start_day,
                    end_day,
                } => ReservationError::CarUnavailable {
                    car_id,
                    start_day,
                    end_day,
                },
                other => other.into(),
            })?;

        metrics::counter!("reservations_admitted_total").increment(1);
        tracing::info!(%reservation, "successfully reserved");

        if let Err(error) = self.emitter.send_reservation_invoice(&reservation).await {
            tracing::error!(
                error = %error,
                reservation_id = %reservation.id,
                "invoice emission failed; reservation remains Draft"
            );
        }

        Ok(reservation)
    }

    /// Lists cars available over the interval.
    pub async fn availability(
        &self,
        start_day: NaiveDate,
        end_day: NaiveDate,
    ) -> Result<Vec<Car>, ReservationError> {
        self.gate
            .list_available_cars(&self.inventory, start_day, end_day)
            .await
    }

    /// Lists reservations, restricted to the given user when present.
    pub async fn list_reservations(
        &self,
        user_id: Option<&str>,
    ) -> Result<Vec<Reservation>, ReservationError> {
        let all = self.store.list_all().await?;
        Ok(match user_id {
            Some(user) => all.into_iter().filter(|r| r.user_id == user).collect(),
            None => all,
        })
    }

    /// Extends a reservation by exactly one day.
    ///
    /// Only Draft and Active reservations with an end day not yet in the
    /// past can be extended, and the extra day must not collide with
    /// another booking for the same car.
    #[tracing::instrument(skip(self), fields(reservation_id = %id))]
    pub async fn extend_reservation(
        &self,
        id: ReservationId,
        user_id: &str,
    ) -> Result<Reservation, ReservationError> {
        let reservation = self.find_owned(id, user_id).await?;

        if !reservation.state.can_extend() {
            return Err(DomainError::InvalidStateTransition {
                action: "extend",
                state: reservation.state,
            }
            .into());
        }
        if reservation.end_day < today() {
            return Err(DomainError::ExtendExpired.into());
        }

        let new_end_day = reservation.end_day + Duration::days(1);
        let available = self
            .gate
            .is_available(
                reservation.car_id,
                reservation.start_day,
                new_end_day,
                Some(reservation.id),
            )
            .await?;
        if !available {
            return Err(ReservationError::CarUnavailable {
                car_id: reservation.car_id,
                start_day: reservation.start_day,
                end_day: new_end_day,
            });
        }

        let rows = self.store.update_end_day(id, new_end_day).await?;
        if rows == 0 {
            return Err(ReservationError::NotFound(id));
        }

        tracing::info!(%new_end_day, "extended reservation");
        Ok(Reservation {
            end_day: new_end_day,
            ..reservation
        })
    }

    /// Cancels a reservation by transitioning it to Declined.
    ///
    /// Finished reservations cannot be cancelled, and cancelling twice is
    /// an error. When the start day is today or tomorrow a warning is
    /// logged that an active rental may exist; the core does not stop a
    /// rental automatically.
    #[tracing::instrument(skip(self), fields(reservation_id = %id))]
    pub async fn cancel_reservation(
        &self,
        id: ReservationId,
        user_id: &str,
    ) -> Result<Reservation, ReservationError> {
        let reservation = self.find_owned(id, user_id).await?;

        match reservation.state {
            ReservationState::Finished => Err(DomainError::CannotCancelFinished.into()),
            ReservationState::Declined => Err(DomainError::AlreadyCancelled.into()),
            old_state => {
                let rows = self
                    .store
                    .update_state(id, ReservationState::Declined)
                    .await?;
                if rows == 0 {
                    return Err(ReservationError::NotFound(id));
                }

                metrics::counter!("reservations_cancelled_total").increment(1);
                tracing::info!(%old_state, "cancelled reservation");

                if reservation.start_day <= today() + Duration::days(1) {
                    tracing::warn!("reservation cancelled but rental might be active");
                }

                Ok(Reservation {
                    state: ReservationState::Declined,
                    ..reservation
                })
            }
        }
    }

    /// Finds a reservation visible to the caller; foreign reservations
    /// are reported as not found.
    async fn find_owned(
        &self,
        id: ReservationId,
        user_id: &str,
    ) -> Result<Reservation, ReservationError> {
        let reservation = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(ReservationError::NotFound(id))?;
        if reservation.user_id != user_id {
            return Err(ReservationError::NotFound(id));
        }
        Ok(reservation)
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
