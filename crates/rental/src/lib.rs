//! Billing-side service for the car-rental saga.
//!
//! Consumes invoices from the `invoices` channel, creates rental records,
//! and reports an `OK` or `FAILURE` processing status back on the
//! `invoice-processing-status` channel. The reservation side reacts to
//! those statuses; the two sides never share storage.

pub mod billing;
pub mod error;
pub mod service;
pub mod store;

pub use billing::BillingProcessor;
pub use error::RentalError;
pub use service::RentalService;
pub use store::{InMemoryRentalStore, RentalStore, RentalStoreError};
