//! Per-connection dispatcher.
//!
//! [`PeerSession`] ties one negotiation session and one transfer
//! accumulator to one peer channel. The host owns the event sources (relay
//! socket, channel callbacks, user actions) and feeds them in one at a
//! time; handlers never run concurrently, so session state needs no locks.
//!
//! Per-message failures are absorbed here: a bad envelope or frame is
//! logged and dropped without tearing down the relay connection or the
//! dispatcher. Nothing is retried; recovery (starting a fresh session) is
//! the host's call.

use uuid::Uuid;

use crate::channel::{ChannelEvent, DataChannel, PeerConnector};
use crate::error::{Error, Result};
use crate::negotiation::NegotiationSession;
use crate::signaling::SignalingEnvelope;
use crate::transfer::recv::{ReceiveEvent, TransferAccumulator};
use crate::transfer::send::{send_file, FileSource, SendSummary};

/// One peer connection: negotiation, data path gate, and reassembly.
#[derive(Debug)]
pub struct PeerSession<C> {
    id: Uuid,
    negotiation: NegotiationSession<C>,
    accumulator: TransferAccumulator,
    channel_open: bool,
}

impl<C: PeerConnector> PeerSession<C> {
    /// Create a session around a peer connector.
    #[must_use]
    pub fn new(connector: C) -> Self {
        Self {
            id: Uuid::new_v4(),
            negotiation: NegotiationSession::new(connector),
            accumulator: TransferAccumulator::new(),
            channel_open: false,
        }
    }

    /// Session identifier, for correlating host-side logs.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The negotiation state machine.
    #[must_use]
    pub fn negotiation(&self) -> &NegotiationSession<C> {
        &self.negotiation
    }

    /// Mutable access to the negotiation state machine, for bundle
    /// exchange and candidate wrapping.
    pub fn negotiation_mut(&mut self) -> &mut NegotiationSession<C> {
        &mut self.negotiation
    }

    /// Whether the data path is currently usable.
    #[must_use]
    pub fn is_channel_open(&self) -> bool {
        self.channel_open
    }

    /// Begin negotiation as the initiator.
    ///
    /// # Errors
    ///
    /// Propagates [`NegotiationSession::start`] errors unchanged; a repeat
    /// call is the host's bug, not a relay message, so it is not absorbed.
    pub async fn start_negotiation(&mut self) -> Result<SignalingEnvelope> {
        self.negotiation.start().await
    }

    /// Dispatch one envelope from the relay.
    ///
    /// Returns the envelope to relay back, if any. Failures are handled
    /// per-envelope: protocol violations and negotiation errors are logged
    /// and leave the dispatcher running.
    pub async fn handle_relay_envelope(
        &mut self,
        envelope: SignalingEnvelope,
    ) -> Option<SignalingEnvelope> {
        let kind = envelope.kind();
        match self.negotiation.handle_envelope(envelope).await {
            Ok(reply) => reply,
            Err(err) if err.is_protocol_violation() => {
                tracing::warn!(session = %self.id, kind, %err, "dropping bad envelope");
                None
            }
            Err(err) => {
                tracing::error!(session = %self.id, kind, %err, "negotiation step failed");
                None
            }
        }
    }

    /// Dispatch one event from the peer channel capability.
    ///
    /// Returns the receive events the host should act on. Channel closure
    /// or error abandons any in-flight transfer and discards its partial
    /// state; no partial artifact is ever surfaced.
    pub fn handle_channel_event(&mut self, event: ChannelEvent) -> Vec<ReceiveEvent> {
        match event {
            ChannelEvent::Open => {
                tracing::debug!(session = %self.id, "data channel open");
                self.channel_open = true;
                Vec::new()
            }
            ChannelEvent::Message(frame) => {
                if !self.channel_open {
                    tracing::warn!(session = %self.id, "dropping frame before channel open");
                    return Vec::new();
                }
                match self.accumulator.handle_frame(frame) {
                    Ok(events) => events,
                    Err(err) => {
                        tracing::warn!(session = %self.id, %err, "dropping bad frame");
                        Vec::new()
                    }
                }
            }
            ChannelEvent::Closed => {
                tracing::debug!(session = %self.id, "data channel closed");
                self.channel_open = false;
                self.accumulator.discard();
                Vec::new()
            }
            ChannelEvent::Error(reason) => {
                tracing::error!(session = %self.id, %reason, "data channel error");
                self.channel_open = false;
                self.accumulator.discard();
                Vec::new()
            }
        }
    }

    /// Stream a file to the peer over an open channel.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelNotOpen`] until
    /// [`ChannelEvent::Open`] has been dispatched, then behaves as
    /// [`send_file`].
    pub async fn send_file<S, D>(
        &mut self,
        source: &mut S,
        channel: &mut D,
        chunk_size: usize,
    ) -> Result<SendSummary>
    where
        S: FileSource,
        D: DataChannel,
    {
        if !self.channel_open {
            return Err(Error::ChannelNotOpen);
        }
        send_file(source, channel, chunk_size).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{Frame, MemoryChannel};
    use crate::error::Result;
    use crate::negotiation::SignalingState;
    use crate::signaling::{IceCandidate, SessionDescription};
    use crate::transfer::send::MemorySource;

    #[derive(Debug, Default)]
    struct StubConnector {
        fail_remote: bool,
    }

    impl PeerConnector for StubConnector {
        async fn create_offer(&mut self) -> Result<SessionDescription> {
            Ok(SessionDescription::offer("stub offer"))
        }

        async fn create_answer(&mut self) -> Result<SessionDescription> {
            Ok(SessionDescription::answer("stub answer"))
        }

        async fn set_local_description(&mut self, _: &SessionDescription) -> Result<()> {
            Ok(())
        }

        async fn set_remote_description(&mut self, _: &SessionDescription) -> Result<()> {
            if self.fail_remote {
                return Err(Error::ProtocolViolation("unusable description".to_string()));
            }
            Ok(())
        }

        async fn add_remote_candidate(&mut self, _: &IceCandidate) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_send_gated_on_channel_open() {
        let mut session = PeerSession::new(StubConnector::default());
        let mut source = MemorySource::new("gated.bin", vec![0; 8]);
        let (mut near, mut far) = MemoryChannel::pair();

        let result = session.send_file(&mut source, &mut near, 4).await;
        assert!(matches!(result, Err(Error::ChannelNotOpen)));

        session.handle_channel_event(ChannelEvent::Open);
        let summary = session
            .send_file(&mut source, &mut near, 4)
            .await
            .expect("send");
        assert_eq!(summary.chunk_frames, 2);
        assert_eq!(far.drain().len(), 3);
    }

    #[tokio::test]
    async fn test_frames_route_to_accumulator() {
        let mut session = PeerSession::new(StubConnector::default());
        session.handle_channel_event(ChannelEvent::Open);

        let events = session
            .handle_channel_event(ChannelEvent::Message(Frame::Text("a.bin|2".to_string())));
        assert!(matches!(events[0], ReceiveEvent::Started { .. }));

        let events =
            session.handle_channel_event(ChannelEvent::Message(Frame::Binary(vec![1, 2])));
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], ReceiveEvent::Completed(_)));
    }

    #[tokio::test]
    async fn test_frame_before_open_dropped() {
        let mut session = PeerSession::new(StubConnector::default());

        let events = session
            .handle_channel_event(ChannelEvent::Message(Frame::Text("a.bin|2".to_string())));
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_close_discards_partial_transfer() {
        let mut session = PeerSession::new(StubConnector::default());
        session.handle_channel_event(ChannelEvent::Open);
        session.handle_channel_event(ChannelEvent::Message(Frame::Text("big.bin|100".to_string())));
        session.handle_channel_event(ChannelEvent::Message(Frame::Binary(vec![0; 10])));

        let events = session.handle_channel_event(ChannelEvent::Closed);
        assert!(events.is_empty());
        assert!(!session.is_channel_open());

        // No completion ever surfaced for the abandoned transfer.
        session.handle_channel_event(ChannelEvent::Open);
        let events = session
            .handle_channel_event(ChannelEvent::Message(Frame::Text("next.bin|0".to_string())));
        assert!(matches!(events.last(), Some(ReceiveEvent::Completed(_))));
    }

    #[tokio::test]
    async fn test_bad_frame_logged_and_dropped() {
        let mut session = PeerSession::new(StubConnector::default());
        session.handle_channel_event(ChannelEvent::Open);

        let events = session.handle_channel_event(ChannelEvent::Message(Frame::Text(
            "metadata without a size".to_string(),
        )));
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_negotiation_error_absorbed() {
        let mut session = PeerSession::new(StubConnector { fail_remote: true });

        let reply = session
            .handle_relay_envelope(SignalingEnvelope::Offer {
                offer: SessionDescription::offer("bad"),
            })
            .await;

        assert!(reply.is_none());
        assert_eq!(session.negotiation().state(), SignalingState::Failed);
    }

    #[tokio::test]
    async fn test_offer_answered_through_session() {
        let mut session = PeerSession::new(StubConnector::default());

        let reply = session
            .handle_relay_envelope(SignalingEnvelope::Offer {
                offer: SessionDescription::offer("remote"),
            })
            .await;

        assert!(matches!(reply, Some(SignalingEnvelope::Answer { .. })));
        assert_eq!(session.negotiation().state(), SignalingState::Connected);
    }
}
