//! Reservation-side service for the car-rental saga.
//!
//! This crate owns the reservation lifecycle:
//! - admission control against double-booking ([`admission`])
//! - invoice emission onto the billing channel ([`invoice`])
//! - settlement of processing statuses with bounded retry ([`settlement`])
//! - the storage port with in-memory and PostgreSQL backends ([`store`])
//!
//! Cross-service coordination happens entirely through the message ports
//! in the `messaging` crate; the billing side lives in the `rental` crate.

pub mod admission;
pub mod error;
pub mod inventory;
pub mod invoice;
pub mod retry;
pub mod service;
pub mod settlement;
pub mod store;

pub use admission::AdmissionGate;
pub use error::ReservationError;
pub use inventory::{Car, InMemoryInventoryClient, InventoryClient};
pub use invoice::InvoiceEmitter;
pub use retry::{Backoff, RetriesExhausted, RetryPolicy, retry_with_policy};
pub use service::{ANONYMOUS_USER, MakeReservation, ReservationService};
pub use settlement::SettlementProcessor;
pub use store::{InMemoryReservationStore, PostgresReservationStore, ReservationStore, StoreError};
