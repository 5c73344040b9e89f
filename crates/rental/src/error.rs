//! Billing-side error types.

use crate::store::RentalStoreError;

/// Errors raised while creating rentals or reporting statuses.
#[derive(Debug, thiserror::Error)]
pub enum RentalError {
    #[error("rental store error: {0}")]
    Store(#[from] RentalStoreError),

    #[error(transparent)]
    Messaging(#[from] messaging::MessagingError),
}
