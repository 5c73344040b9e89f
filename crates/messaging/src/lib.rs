//! Message channel ports for the reservation saga.
//!
//! The core never talks to a broker directly. It publishes and consumes
//! through the [`MessagePublisher`] and [`MessageConsumer`] ports, which
//! calling code wires to a concrete transport. The in-memory transport in
//! [`channel`] backs tests and the single-process demo binary; a real
//! deployment would wire the same ports to a broker that provides
//! at-least-once delivery.
//!
//! Acknowledgment is post-processing: a consumer receives a
//! [`Delivery`], processes the payload, and only then acks. Unacked
//! deliveries are observable so tests can assert the ack discipline.

pub mod channel;
pub mod error;

use async_trait::async_trait;

pub use channel::{InMemoryConsumer, InMemoryPublisher, in_memory_channel};
pub use error::MessagingError;

/// Channel carrying invoices from the reservation side to billing.
pub const INVOICES_CHANNEL: &str = "invoices";

/// Channel carrying processing statuses back from billing.
pub const INVOICE_STATUS_CHANNEL: &str = "invoice-processing-status";

/// Default consumer-side buffer capacity for in-flight messages.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// Result type for messaging operations.
pub type Result<T> = std::result::Result<T, MessagingError>;

/// Port for publishing messages onto a named channel.
///
/// A full buffer surfaces [`MessagingError::ChannelFull`]; messages are
/// never silently dropped.
#[async_trait]
pub trait MessagePublisher<T: Send + 'static>: Send + Sync {
    /// Publishes a message, failing if the channel buffer is full or closed.
    async fn publish(&self, message: T) -> Result<()>;
}

/// Port for consuming messages from a named channel.
#[async_trait]
pub trait MessageConsumer<T: Send + 'static>: Send {
    /// Receives the next delivery, or `None` when the channel is closed
    /// and drained.
    async fn recv(&mut self) -> Option<Delivery<T>>;
}

/// A received message together with its acknowledgment token.
#[derive(Debug)]
pub struct Delivery<T> {
    payload: T,
    token: AckToken,
}

impl<T> Delivery<T> {
    /// Wraps a payload with its ack token.
    pub fn new(payload: T, token: AckToken) -> Self {
        Self { payload, token }
    }

    /// Borrows the payload without acknowledging.
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// Splits into payload and ack token, so the payload can be processed
    /// before the token is acked.
    pub fn into_parts(self) -> (T, AckToken) {
        (self.payload, self.token)
    }
}

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Token acknowledging one delivery.
///
/// Dropping the token without calling [`AckToken::ack`] leaves the
/// delivery in-flight, mirroring a consumer crash before acknowledgment
/// (the message would be redelivered by an at-least-once broker).
#[derive(Debug)]
pub struct AckToken {
    in_flight: Arc<AtomicUsize>,
}

impl AckToken {
    pub(crate) fn new(in_flight: Arc<AtomicUsize>) -> Self {
        in_flight.fetch_add(1, Ordering::SeqCst);
        Self { in_flight }
    }

    /// Acknowledges the delivery.
    pub fn ack(self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
