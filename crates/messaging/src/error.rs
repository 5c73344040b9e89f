//! Messaging error types.

use thiserror::Error;

/// Errors that can occur when publishing to a channel.
#[derive(Debug, Error)]
pub enum MessagingError {
    /// The channel's bounded buffer is full; the producer must surface
    /// this rather than drop the message.
    #[error("Channel '{channel}' is full (capacity {capacity})")]
    ChannelFull {
        channel: &'static str,
        capacity: usize,
    },

    /// The channel has been closed by the other side.
    #[error("Channel '{channel}' is closed")]
    Closed { channel: &'static str },
}
