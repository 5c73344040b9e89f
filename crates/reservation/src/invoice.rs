//! Invoice emission for admitted reservations.

use domain::{DomainError, Invoice, Reservation, validation};
use messaging::MessagePublisher;

use crate::error::ReservationError;

/// Emits priced invoices onto the billing channel.
pub struct InvoiceEmitter<P: MessagePublisher<Invoice>> {
    publisher: P,
}

impl<P: MessagePublisher<Invoice>> InvoiceEmitter<P> {
    /// Creates a new emitter over the given publisher port.
    pub fn new(publisher: P) -> Self {
        Self { publisher }
    }

    /// Prices the reservation, validates the invoice, and publishes it.
    ///
    /// Fails fast without publishing when the constructed invoice is
    /// invalid. A transport-level publish failure is surfaced to the
    /// caller but does not roll back the reservation, which remains
    /// Draft pending out-of-band remediation.
    #[tracing::instrument(skip(self, reservation), fields(reservation_id = %reservation.id))]
    pub async fn send_reservation_invoice(
        &self,
        reservation: &Reservation,
    ) -> Result<(), ReservationError> {
        let invoice = Invoice::for_reservation(reservation);

        let violations = validation::validate_invoice(&invoice);
        if !violations.is_empty() {
            return Err(DomainError::validation(violations).into());
        }

        let price = invoice.price;
        match self.publisher.publish(invoice).await {
            Ok(()) => {
                metrics::counter!("invoices_published_total").increment(1);
                tracing::info!(price, "invoice published");
                Ok(())
            }
            Err(error) => {
                tracing::error!(error = %error, %reservation, "couldn't publish invoice");
                Err(error.into())
            }
        }
    }
}
