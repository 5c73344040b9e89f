//! Settlement of invoice processing statuses.

use domain::{
    DomainError, InvoiceProcessingStatus, ProcessingOutcome, Reservation, ReservationState,
    validation,
};
use messaging::MessageConsumer;

use crate::error::ReservationError;
use crate::retry::{RetryPolicy, retry_with_policy};
use crate::store::{ReservationStore, StoreError};

/// Applies billing outcomes to reservations.
///
/// The lookup-and-update step is wrapped in a bounded retry: transient
/// store failures are retried up to the policy's bound, business-level
/// rejections are not. After exhaustion the failure is logged and the
/// message is still acknowledged, so a reservation can remain Draft
/// indefinitely; operators remediate out of band.
pub struct SettlementProcessor<S: ReservationStore> {
    store: S,
    policy: RetryPolicy,
}

impl<S: ReservationStore> SettlementProcessor<S> {
    /// Creates a processor with the default retry policy (3 attempts,
    /// immediate retry).
    pub fn new(store: S) -> Self {
        Self {
            store,
            policy: RetryPolicy::default(),
        }
    }

    /// Creates a processor with a custom retry policy.
    pub fn with_policy(store: S, policy: RetryPolicy) -> Self {
        Self { store, policy }
    }

    /// Processes one status message: validates it, re-locates the
    /// reservation, and applies the terminal transition.
    ///
    /// Returns the settled reservation, or `None` when no reservation
    /// matches (a no-operation, not an error).
    #[tracing::instrument(
        skip(self, status),
        fields(correlation_id = %status.invoice.correlation_id, outcome = %status.outcome)
    )]
    pub async fn process_status(
        &self,
        status: &InvoiceProcessingStatus,
    ) -> Result<Option<Reservation>, ReservationError> {
        let violations = validation::validate_processing_status(status);
        if !violations.is_empty() {
            return Err(DomainError::validation(violations).into());
        }

        match retry_with_policy(self.policy, "settlement", || self.locate_and_settle(status))
            .await
        {
            Ok(settled) => {
                metrics::counter!("settlements_total").increment(1);
                Ok(settled)
            }
            Err(exhausted) => Err(ReservationError::RetriesExhausted {
                attempts: exhausted.attempts,
                reason: exhausted.last_error.to_string(),
            }),
        }
    }

    async fn locate_and_settle(
        &self,
        status: &InvoiceProcessingStatus,
    ) -> Result<Option<Reservation>, StoreError> {
        let snapshot = &status.invoice.reservation;

        // Primary lookup by correlation ID, falling back to the
        // (car, user) pair for statuses that predate it.
        let found = match self.store.find_by_id(status.invoice.correlation_id).await? {
            Some(reservation) => Some(reservation),
            None => {
                self.store
                    .find_by_car_and_user(snapshot.car_id, &snapshot.user_id)
                    .await?
            }
        };

        let Some(mut reservation) = found else {
            tracing::warn!(
                car_id = snapshot.car_id,
                user_id = %snapshot.user_id,
                "no reservation matches processing status; skipping"
            );
            return Ok(None);
        };

        let target = match status.outcome {
            ProcessingOutcome::Ok => ReservationState::Active,
            ProcessingOutcome::Failure => ReservationState::Declined,
        };

        // Redelivered status: the transition was already applied.
        if reservation.state == target {
            tracing::info!(reservation_id = %reservation.id, state = %target, "duplicate status; already settled");
            return Ok(Some(reservation));
        }

        // A finished rental is never reopened by a late status.
        if reservation.state == ReservationState::Finished {
            tracing::warn!(reservation_id = %reservation.id, "status arrived for finished reservation; skipping");
            return Ok(Some(reservation));
        }

        // A cancel racing the settlement round trip is an accepted race:
        // a first-time status overwrites the cancelled state.
        if reservation.state != ReservationState::Draft {
            tracing::warn!(
                reservation_id = %reservation.id,
                from = %reservation.state,
                to = %target,
                "status overwrites non-draft reservation"
            );
        }

        let rows = self.store.update_state(reservation.id, target).await?;
        if rows == 0 {
            return Err(StoreError::NotFound(reservation.id));
        }
        reservation.state = target;

        match target {
            ReservationState::Active => {
                tracing::info!(reservation_id = %reservation.id, "reservation activated");
            }
            _ => {
                tracing::info!(reservation_id = %reservation.id, "reservation declined due to payment failure");
            }
        }

        Ok(Some(reservation))
    }

    /// Consumes processing statuses until the channel closes.
    ///
    /// Every delivery is acknowledged after processing, including
    /// exhausted retries and validation failures, which are logged.
    pub async fn run<C: MessageConsumer<InvoiceProcessingStatus>>(&self, consumer: &mut C) {
        while let Some(delivery) = consumer.recv().await {
            let (status, token) = delivery.into_parts();
            if let Err(error) = self.process_status(&status).await {
                metrics::counter!("settlement_failures_total").increment(1);
                tracing::error!(error = %error, "processing invoice payment status failed");
            }
            token.ack();
        }
        tracing::info!("settlement channel closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryReservationStore;
    use chrono::NaiveDate;
    use common::RentalId;
    use domain::{Invoice, Rental};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn draft_reservation() -> Reservation {
        Reservation::new(42, "alice", day(2025, 6, 1), day(2025, 6, 5))
    }

    fn ok_status(reservation: &Reservation) -> InvoiceProcessingStatus {
        let invoice = Invoice::for_reservation(reservation);
        let rental = Rental {
            id: RentalId::new(),
            user_id: reservation.user_id.clone(),
            reservation_id: reservation.id,
            car_id: reservation.car_id,
            start_date: reservation.start_day,
            active: false,
        };
        InvoiceProcessingStatus::ok(invoice, rental)
    }

    fn failure_status(reservation: &Reservation) -> InvoiceProcessingStatus {
        InvoiceProcessingStatus::failure(Invoice::for_reservation(reservation))
    }

    #[tokio::test]
    async fn ok_status_activates_draft_reservation() {
        let store = InMemoryReservationStore::new();
        let reservation = draft_reservation();
        store.insert(reservation.clone()).await.unwrap();

        let processor = SettlementProcessor::new(store.clone());
        let settled = processor
            .process_status(&ok_status(&reservation))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(settled.state, ReservationState::Active);

        let stored = store.find_by_id(reservation.id).await.unwrap().unwrap();
        assert_eq!(stored.state, ReservationState::Active);
    }

    #[tokio::test]
    async fn failure_status_declines_draft_reservation() {
        let store = InMemoryReservationStore::new();
        let reservation = draft_reservation();
        store.insert(reservation.clone()).await.unwrap();

        let processor = SettlementProcessor::new(store.clone());
        let settled = processor
            .process_status(&failure_status(&reservation))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(settled.state, ReservationState::Declined);
    }

    #[tokio::test]
    async fn duplicate_ok_status_is_a_noop() {
        let store = InMemoryReservationStore::new();
        let reservation = draft_reservation();
        store.insert(reservation.clone()).await.unwrap();

        let processor = SettlementProcessor::new(store.clone());
        let status = ok_status(&reservation);
        processor.process_status(&status).await.unwrap();
        let second = processor.process_status(&status).await.unwrap().unwrap();

        assert_eq!(second.state, ReservationState::Active);
    }

    #[tokio::test]
    async fn missing_reservation_is_a_noop() {
        let store = InMemoryReservationStore::new();
        let processor = SettlementProcessor::new(store);

        let reservation = draft_reservation();
        let settled = processor
            .process_status(&ok_status(&reservation))
            .await
            .unwrap();
        assert!(settled.is_none());
    }

    #[tokio::test]
    async fn falls_back_to_car_and_user_lookup() {
        let store = InMemoryReservationStore::new();
        let reservation = draft_reservation();
        store.insert(reservation.clone()).await.unwrap();

        // A status whose correlation ID is unknown but whose snapshot
        // matches the stored reservation.
        let mut status = ok_status(&reservation);
        status.invoice.correlation_id = common::ReservationId::new();

        let processor = SettlementProcessor::new(store);
        let settled = processor.process_status(&status).await.unwrap().unwrap();
        assert_eq!(settled.id, reservation.id);
        assert_eq!(settled.state, ReservationState::Active);
    }

    #[tokio::test]
    async fn retries_transient_failure_and_succeeds_on_second_attempt() {
        let store = InMemoryReservationStore::new();
        let reservation = draft_reservation();
        store.insert(reservation.clone()).await.unwrap();
        store.set_fail_next(1);

        let processor = SettlementProcessor::new(store.clone());
        let settled = processor
            .process_status(&failure_status(&reservation))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(settled.state, ReservationState::Declined);
    }

    #[tokio::test]
    async fn exhausted_retries_return_typed_failure() {
        let store = InMemoryReservationStore::new();
        let reservation = draft_reservation();
        store.insert(reservation.clone()).await.unwrap();
        store.set_fail_next(10);

        let processor = SettlementProcessor::new(store.clone());
        let result = processor.process_status(&failure_status(&reservation)).await;
        assert!(matches!(
            result,
            Err(ReservationError::RetriesExhausted { attempts: 3, .. })
        ));

        // The reservation is stuck in Draft until remediated out of band.
        store.set_fail_next(0);
        let stored = store.find_by_id(reservation.id).await.unwrap().unwrap();
        assert_eq!(stored.state, ReservationState::Draft);
    }

    #[tokio::test]
    async fn invalid_status_is_rejected_without_retry() {
        let store = InMemoryReservationStore::new();
        let reservation = draft_reservation();
        store.insert(reservation.clone()).await.unwrap();

        let mut status = failure_status(&reservation);
        status.invoice.price = -1.0;

        let processor = SettlementProcessor::new(store);
        let result = processor.process_status(&status).await;
        assert!(matches!(
            result,
            Err(ReservationError::Domain(DomainError::Validation { .. }))
        ));
    }

    #[tokio::test]
    async fn status_overwrites_cancelled_reservation() {
        let store = InMemoryReservationStore::new();
        let mut reservation = draft_reservation();
        reservation.state = ReservationState::Declined; // cancelled while invoice in flight
        store.insert(reservation.clone()).await.unwrap();

        let processor = SettlementProcessor::new(store.clone());
        let settled = processor
            .process_status(&ok_status(&reservation))
            .await
            .unwrap()
            .unwrap();

        // Accepted race: the first OK status still activates.
        assert_eq!(settled.state, ReservationState::Active);
    }

    #[tokio::test]
    async fn finished_reservation_is_never_reopened() {
        let store = InMemoryReservationStore::new();
        let mut reservation = draft_reservation();
        reservation.state = ReservationState::Finished;
        store.insert(reservation.clone()).await.unwrap();

        let processor = SettlementProcessor::new(store.clone());
        let settled = processor
            .process_status(&ok_status(&reservation))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(settled.state, ReservationState::Finished);
    }

    #[tokio::test]
    async fn run_acks_every_delivery() {
        let store = InMemoryReservationStore::new();
        let reservation = draft_reservation();
        store.insert(reservation.clone()).await.unwrap();

        let (publisher, mut consumer) = messaging::in_memory_channel("invoice-processing-status", 4);
        use messaging::MessagePublisher;
        publisher.publish(ok_status(&reservation)).await.unwrap();
        drop(publisher);

        let processor = SettlementProcessor::new(store.clone());
        processor.run(&mut consumer).await;

        assert_eq!(consumer.in_flight(), 0);
        let stored = store.find_by_id(reservation.id).await.unwrap().unwrap();
        assert_eq!(stored.state, ReservationState::Active);
    }
}
