//! Bounded in-memory channel transport.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::{AckToken, Delivery, MessageConsumer, MessagePublisher, MessagingError, Result};

/// Creates a bounded in-memory channel with the given name and capacity.
///
/// Returns the publisher and consumer halves. The capacity bounds the
/// number of buffered (not yet received) messages; a publish against a
/// full buffer fails with [`MessagingError::ChannelFull`].
pub fn in_memory_channel<T: Send + 'static>(
    name: &'static str,
    capacity: usize,
) -> (InMemoryPublisher<T>, InMemoryConsumer<T>) {
    let (tx, rx) = mpsc::channel(capacity);
    let in_flight = Arc::new(AtomicUsize::new(0));

    let publisher = InMemoryPublisher {
        name,
        capacity,
        tx,
        in_flight: in_flight.clone(),
    };
    let consumer = InMemoryConsumer {
        name,
        rx,
        in_flight,
    };
    (publisher, consumer)
}

/// Publisher half of an in-memory channel.
#[derive(Clone)]
pub struct InMemoryPublisher<T> {
    name: &'static str,
    capacity: usize,
    tx: mpsc::Sender<T>,
    in_flight: Arc<AtomicUsize>,
}

impl<T> InMemoryPublisher<T> {
    /// Returns the channel name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the number of received-but-unacked deliveries.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<T: Send + 'static> MessagePublisher<T> for InMemoryPublisher<T> {
    async fn publish(&self, message: T) -> Result<()> {
        match self.tx.try_send(message) {
            Ok(()) => {
                tracing::debug!(channel = self.name, "message published");
                Ok(())
            }
            Err(TrySendError::Full(_)) => Err(MessagingError::ChannelFull {
                channel: self.name,
                capacity: self.capacity,
            }),
            Err(TrySendError::Closed(_)) => Err(MessagingError::Closed { channel: self.name }),
        }
    }
}

/// Consumer half of an in-memory channel.
pub struct InMemoryConsumer<T> {
    name: &'static str,
    rx: mpsc::Receiver<T>,
    in_flight: Arc<AtomicUsize>,
}

impl<T> InMemoryConsumer<T> {
    /// Returns the channel name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the number of received-but-unacked deliveries.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<T: Send + 'static> MessageConsumer<T> for InMemoryConsumer<T> {
    async fn recv(&mut self) -> Option<Delivery<T>> {
        let payload = self.rx.recv().await?;
        tracing::debug!(channel = self.name, "message received");
        Some(Delivery::new(payload, AckToken::new(self.in_flight.clone())))
    }
}
