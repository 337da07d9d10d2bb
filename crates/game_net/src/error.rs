//! Network-layer error types.

/// Errors that can occur in the wire layer.
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    /// Failed to encode a message to MessagePack.
    #[error("failed to encode message: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// Failed to decode a message from MessagePack.
    #[error("failed to decode message: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    /// The peer's channel is gone (disconnect). Isolated to that client;
    /// never aborts the tick.
    #[error("message channel closed")]
    ChannelClosed,

    /// An inbound message failed server-side validation. Surfaced only to
    /// the offending client; never mutates state.
    #[error("invalid message: {0}")]
    Validation(String),
}
