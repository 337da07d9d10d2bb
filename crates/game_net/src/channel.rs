//! The per-client message channel.
//!
//! One persistent, ordered, full-duplex channel per client, carrying
//! discrete framed records. Sends are fire-and-forget: the tick never blocks
//! on network I/O, and a closed peer surfaces as
//! [`NetError::ChannelClosed`], isolated to that client.
//!
//! The channel is deliberately transport-agnostic — a websocket bridge, a
//! local bot, or a test harness all plug in by holding the remote end of a
//! [`MessageChannel::pair`].

use tokio::sync::mpsc;
use tracing::trace;

use crate::error::NetError;

/// One end of an ordered, full-duplex message channel.
#[derive(Debug)]
pub struct MessageChannel {
    tx: mpsc::UnboundedSender<Vec<u8>>,
    rx: mpsc::UnboundedReceiver<Vec<u8>>,
}

impl MessageChannel {
    /// Create a connected pair of channel ends.
    #[must_use]
    pub fn pair() -> (MessageChannel, MessageChannel) {
        let (a_tx, a_rx) = mpsc::unbounded_channel();
        let (b_tx, b_rx) = mpsc::unbounded_channel();
        (
            MessageChannel { tx: a_tx, rx: b_rx },
            MessageChannel { tx: b_tx, rx: a_rx },
        )
    }

    /// Queue a framed record for the peer. Fire-and-forget; never blocks.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::ChannelClosed`] when the peer is gone.
    pub fn send(&self, frame: Vec<u8>) -> Result<(), NetError> {
        trace!(bytes = frame.len(), "channel send");
        self.tx.send(frame).map_err(|_| NetError::ChannelClosed)
    }

    /// Take the next pending inbound record, if any. Never blocks.
    pub fn try_recv(&mut self) -> Option<Vec<u8>> {
        self.rx.try_recv().ok()
    }

    /// Whether the peer has dropped its end.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
