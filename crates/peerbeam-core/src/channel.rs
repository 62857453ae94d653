//! Peer channel abstraction.
//!
//! The direct data path between two peers is established by a negotiation
//! library and carried by a transport the engine never sees (a WebRTC data
//! channel in a typical deployment). This module defines the two seams the
//! host plugs such a library into:
//!
//! - [`PeerConnector`] - the negotiation surface the state machine drives
//!   (descriptions and candidates)
//! - [`DataChannel`] - the established data path frames are sent on
//!
//! Both are assumed reliable and ordered once open. Frame boundaries are
//! the channel's own message boundaries; the transfer protocol relies on
//! them instead of length prefixes.
//!
//! [`MemoryChannel`] is an in-process channel pair used by the tests and
//! usable by hosts that run both endpoints in one process.

use tokio::sync::mpsc;

use crate::error::{Error, Result};
use crate::signaling::{IceCandidate, SessionDescription};

/// One discrete message on the peer channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Text frame (transfer metadata)
    Text(String),
    /// Binary frame (file chunk)
    Binary(Vec<u8>),
}

impl Frame {
    /// Payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Text(text) => text.len(),
            Self::Binary(bytes) => bytes.len(),
        }
    }

    /// Consume the frame and return its payload bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Text(text) => text.into_bytes(),
            Self::Binary(bytes) => bytes,
        }
    }
}

/// Event fired by the peer channel capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// The data path became usable
    Open,
    /// A frame arrived
    Message(Frame),
    /// The channel closed
    Closed,
    /// The channel failed
    Error(String),
}

/// Negotiation surface of the peer channel capability.
///
/// All operations are asynchronous: description work is the point where
/// control yields back to the dispatcher. Errors from these calls fail the
/// negotiation step that invoked them.
pub trait PeerConnector {
    /// Produce a local offer description.
    async fn create_offer(&mut self) -> Result<SessionDescription>;

    /// Produce a local answer to the current remote offer.
    async fn create_answer(&mut self) -> Result<SessionDescription>;

    /// Commit a local description.
    async fn set_local_description(&mut self, description: &SessionDescription) -> Result<()>;

    /// Apply a description received from the remote peer.
    async fn set_remote_description(&mut self, description: &SessionDescription) -> Result<()>;

    /// Queue a connectivity candidate received from the remote peer.
    ///
    /// Candidates may arrive before, during, or after the offer/answer
    /// exchange; implementations must tolerate early candidates.
    async fn add_remote_candidate(&mut self, candidate: &IceCandidate) -> Result<()>;
}

/// Established data path of the peer channel capability.
pub trait DataChannel {
    /// Send one frame. Resolves once the frame is handed to the transport,
    /// preserving send order for sequential callers.
    async fn send(&mut self, frame: Frame) -> Result<()>;
}

/// In-process data channel backed by a pair of unbounded queues.
#[derive(Debug)]
pub struct MemoryChannel {
    tx: mpsc::UnboundedSender<Frame>,
    rx: mpsc::UnboundedReceiver<Frame>,
}

impl MemoryChannel {
    /// Create two connected channel halves.
    #[must_use]
    pub fn pair() -> (Self, Self) {
        let (tx_a, rx_b) = mpsc::unbounded_channel();
        let (tx_b, rx_a) = mpsc::unbounded_channel();
        (
            Self { tx: tx_a, rx: rx_a },
            Self { tx: tx_b, rx: rx_b },
        )
    }

    /// Receive the next frame sent by the other half, or `None` once it
    /// was dropped.
    pub async fn recv(&mut self) -> Option<Frame> {
        self.rx.recv().await
    }

    /// Drain every frame currently queued without waiting.
    pub fn drain(&mut self) -> Vec<Frame> {
        let mut frames = Vec::new();
        while let Ok(frame) = self.rx.try_recv() {
            frames.push(frame);
        }
        frames
    }
}

impl DataChannel for MemoryChannel {
    async fn send(&mut self, frame: Frame) -> Result<()> {
        self.tx.send(frame).map_err(|_| Error::ChannelClosed)
    }
}
