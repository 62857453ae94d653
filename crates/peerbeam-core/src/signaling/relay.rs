//! Relay client for the rendezvous connection.
//!
//! The relay delivers signaling messages between exactly two parties, in
//! order and reliably. The engine does not care what carries them; the
//! host supplies any ordered text transport through [`RelayTransport`]
//! (a WebSocket in a typical deployment). [`MemoryTransport`] provides a
//! connected in-process pair for tests and single-process embedding.

use tokio::sync::mpsc;

use crate::error::{Error, Result};
use crate::signaling::{self, SignalingEnvelope};

/// An ordered, reliable text-message transport to the rendezvous service.
pub trait RelayTransport {
    /// Send one text message.
    async fn send_text(&mut self, text: String) -> Result<()>;

    /// Receive the next text message, or `None` once the connection closed.
    async fn recv_text(&mut self) -> Option<String>;
}

/// Signaling client over a relay transport.
///
/// Encodes outbound envelopes to JSON and decodes inbound messages,
/// dropping anything undecodable so one malformed message never takes the
/// relay connection down.
#[derive(Debug)]
pub struct RelayClient<T> {
    transport: T,
}

impl<T: RelayTransport> RelayClient<T> {
    /// Wrap a relay transport.
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Send one signaling envelope.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or the transport is closed.
    pub async fn send(&mut self, envelope: &SignalingEnvelope) -> Result<()> {
        let text = signaling::encode(envelope)?;
        tracing::debug!(kind = envelope.kind(), "sending signaling message");
        self.transport.send_text(text).await
    }

    /// Receive the next well-formed signaling envelope.
    ///
    /// Messages that fail to decode (unknown type, malformed JSON) are
    /// logged and skipped. Returns `None` once the relay connection closed.
    pub async fn recv(&mut self) -> Option<SignalingEnvelope> {
        loop {
            let text = self.transport.recv_text().await?;
            match signaling::decode(&text) {
                Ok(envelope) => {
                    tracing::debug!(kind = envelope.kind(), "received signaling message");
                    return Some(envelope);
                }
                Err(err) => {
                    tracing::error!(%err, "dropping undecodable signaling message");
                }
            }
        }
    }
}

/// In-process relay transport backed by a pair of unbounded channels.
#[derive(Debug)]
pub struct MemoryTransport {
    tx: mpsc::UnboundedSender<String>,
    rx: mpsc::UnboundedReceiver<String>,
}

impl MemoryTransport {
    /// Create two connected transports.
    ///
    /// Whatever one side sends, the other receives, in order.
    #[must_use]
    pub fn pair() -> (Self, Self) {
        let (tx_a, rx_b) = mpsc::unbounded_channel();
        let (tx_b, rx_a) = mpsc::unbounded_channel();
        (
            Self { tx: tx_a, rx: rx_a },
            Self { tx: tx_b, rx: rx_b },
        )
    }
}

impl RelayTransport for MemoryTransport {
    async fn send_text(&mut self, text: String) -> Result<()> {
        self.tx.send(text).map_err(|_| Error::RelayClosed)
    }

    async fn recv_text(&mut self) -> Option<String> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signaling::SessionDescription;

    #[tokio::test]
    async fn test_roundtrip_through_memory_pair() {
        let (a, b) = MemoryTransport::pair();
        let mut client_a = RelayClient::new(a);
        let mut client_b = RelayClient::new(b);

        let envelope = SignalingEnvelope::Offer {
            offer: SessionDescription::offer("v=0"),
        };
        client_a.send(&envelope).await.expect("send");

        let received = client_b.recv().await.expect("recv");
        assert_eq!(received, envelope);
    }

    #[tokio::test]
    async fn test_undecodable_message_skipped() {
        let (mut a, b) = MemoryTransport::pair();
        let mut client_b = RelayClient::new(b);

        a.send_text(r#"{"type":"hello"}"#.to_string())
            .await
            .expect("send raw");
        let envelope = SignalingEnvelope::Candidate {
            candidate: crate::signaling::IceCandidate::new("candidate:1"),
        };
        a.send_text(signaling::encode(&envelope).expect("encode"))
            .await
            .expect("send raw");

        let received = client_b.recv().await.expect("recv");
        assert_eq!(received, envelope);
    }

    #[tokio::test]
    async fn test_recv_none_after_peer_dropped() {
        let (a, b) = MemoryTransport::pair();
        let mut client_b = RelayClient::new(b);

        drop(a);
        assert!(client_b.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_send_fails_after_peer_dropped() {
        let (a, b) = MemoryTransport::pair();
        let mut client_a = RelayClient::new(a);

        drop(b);
        let envelope = SignalingEnvelope::Answer {
            answer: SessionDescription::answer("v=0"),
        };
        let result = client_a.send(&envelope).await;
        assert!(matches!(result, Err(Error::RelayClosed)));
    }
}
