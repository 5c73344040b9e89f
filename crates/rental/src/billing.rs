//! Invoice processing loop.

use domain::{Invoice, InvoiceProcessingStatus};
use messaging::{MessageConsumer, MessagePublisher};

use crate::service::RentalService;
use crate::store::RentalStore;

/// Consumes invoices, creates rentals, and reports processing statuses.
///
/// A billing failure is not an error of the processor: it becomes a
/// `FAILURE` status so the reservation side can compensate. Only the
/// status publish itself can fail, in which case the delivery is left
/// unacked for redelivery.
pub struct BillingProcessor<R, P>
where
    R: RentalStore,
    P: MessagePublisher<InvoiceProcessingStatus>,
{
    rentals: RentalService<R>,
    status_publisher: P,
}

impl<R, P> BillingProcessor<R, P>
where
    R: RentalStore,
    P: MessagePublisher<InvoiceProcessingStatus>,
{
    /// Creates a processor over the given rental store and status publisher.
    pub fn new(store: R, status_publisher: P) -> Self {
        Self {
            rentals: RentalService::new(store),
            status_publisher,
        }
    }

    /// Processes one invoice into its status.
    #[tracing::instrument(skip(self, invoice), fields(correlation_id = %invoice.correlation_id))]
    pub async fn process_invoice(&self, invoice: Invoice) -> InvoiceProcessingStatus {
        let snapshot = &invoice.reservation;
        match self
            .rentals
            .create_rental(
                &snapshot.user_id,
                invoice.correlation_id,
                snapshot.car_id,
                snapshot.start_day,
            )
            .await
        {
            Ok(rental) => {
                metrics::counter!("invoices_processed_total", "outcome" => "ok").increment(1);
                InvoiceProcessingStatus::ok(invoice, rental)
            }
            Err(error) => {
                metrics::counter!("invoices_processed_total", "outcome" => "failure").increment(1);
                tracing::error!(error = %error, %invoice, "invoice processing failed");
                InvoiceProcessingStatus::failure(invoice)
            }
        }
    }

    /// Consumes invoices until the channel closes.
    ///
    /// The delivery is acked only after its status has been published;
    /// a publish failure leaves it in-flight for redelivery.
    pub async fn run<C: MessageConsumer<Invoice>>(&self, consumer: &mut C) {
        while let Some(delivery) = consumer.recv().await {
            let (invoice, token) = delivery.into_parts();
            let status = self.process_invoice(invoice).await;
            match self.status_publisher.publish(status).await {
                Ok(()) => token.ack(),
                Err(error) => {
                    tracing::error!(error = %error, "couldn't publish processing status");
                }
            }
        }
        tracing::info!("invoices channel closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryRentalStore;
    use chrono::NaiveDate;
    use domain::{ProcessingOutcome, Reservation};
    use messaging::in_memory_channel;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn invoice() -> Invoice {
        Invoice::for_reservation(&Reservation::new(
            42,
            "alice",
            day(2025, 6, 1),
            day(2025, 6, 5),
        ))
    }

    #[tokio::test]
    async fn accepted_invoice_yields_ok_status_with_rental() {
        let (publisher, _consumer) = in_memory_channel("invoice-processing-status", 4);
        let processor = BillingProcessor::new(InMemoryRentalStore::new(), publisher);

        let invoice = invoice();
        let status = processor.process_invoice(invoice.clone()).await;

        assert_eq!(status.outcome, ProcessingOutcome::Ok);
        let rental = status.rental.unwrap();
        assert_eq!(rental.reservation_id, invoice.correlation_id);
        assert_eq!(rental.car_id, 42);
        assert_eq!(rental.start_date, day(2025, 6, 1));
    }

    #[tokio::test]
    async fn failed_billing_yields_failure_status() {
        let store = InMemoryRentalStore::new();
        store.set_fail_on_create(true);
        let (publisher, _consumer) = in_memory_channel("invoice-processing-status", 4);
        let processor = BillingProcessor::new(store, publisher);

        let status = processor.process_invoice(invoice()).await;
        assert_eq!(status.outcome, ProcessingOutcome::Failure);
        assert!(status.rental.is_none());
    }

    #[tokio::test]
    async fn run_publishes_status_and_acks() {
        let store = InMemoryRentalStore::new();
        let (invoice_tx, mut invoice_rx) = in_memory_channel("invoices", 4);
        let (status_tx, mut status_rx) = in_memory_channel("invoice-processing-status", 4);

        invoice_tx.publish(invoice()).await.unwrap();
        drop(invoice_tx);

        let processor = BillingProcessor::new(store, status_tx);
        processor.run(&mut invoice_rx).await;

        assert_eq!(invoice_rx.in_flight(), 0);
        let (status, token) = status_rx.recv().await.unwrap().into_parts();
        assert_eq!(status.outcome, ProcessingOutcome::Ok);
        token.ack();
    }

    #[tokio::test]
    async fn status_publish_failure_leaves_delivery_unacked() {
        let store = InMemoryRentalStore::new();
        let (invoice_tx, mut invoice_rx) = in_memory_channel("invoices", 4);
        // Full status channel: the publish in run() must fail.
        let (status_tx, _status_rx) = in_memory_channel("invoice-processing-status", 1);
        status_tx
            .publish(InvoiceProcessingStatus::failure(invoice()))
            .await
            .unwrap();

        invoice_tx.publish(invoice()).await.unwrap();
        drop(invoice_tx);

        let processor = BillingProcessor::new(store, status_tx);
        processor.run(&mut invoice_rx).await;

        assert_eq!(invoice_rx.in_flight(), 1);
    }
}
