//! Offer/answer/candidate negotiation state machine.
//!
//! One [`NegotiationSession`] drives one connection attempt. The initiator
//! calls [`start`](NegotiationSession::start) and sends the returned offer
//! through the relay; the responder feeds every inbound envelope to
//! [`handle_envelope`](NegotiationSession::handle_envelope) and relays back
//! whatever it returns. Once both sides are `Connected` the peer channel
//! capability finishes connectivity checks on its own and fires
//! [`ChannelEvent::Open`](crate::channel::ChannelEvent::Open).
//!
//! ```text
//! initiator:  Idle -> HaveLocalOffer -> Connected
//! responder:  Idle -> HaveRemoteOffer -> Connected
//! either:     any state -> Failed (terminal)
//! ```
//!
//! Out-of-place offers and answers are logged and ignored so duplicate or
//! late relay deliveries cannot corrupt an established session. Only a
//! connector failure while applying descriptions moves the session to
//! `Failed`.

use crate::channel::PeerConnector;
use crate::error::{Error, Result};
use crate::signaling::{
    ConnectionBundle, IceCandidate, SdpKind, SessionDescription, SignalingEnvelope,
};

/// Signaling state of one negotiation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalingState {
    /// No description committed yet
    Idle,
    /// Local offer committed, waiting for the remote answer
    HaveLocalOffer,
    /// Remote offer applied, local answer being produced
    HaveRemoteOffer,
    /// Both descriptions committed
    Connected,
    /// Negotiation failed, terminal
    Failed,
}

/// Which side of the exchange this session is, implicit from who sent the
/// first offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Sent the first offer
    Initiator,
    /// Answered a received offer
    Responder,
}

/// State machine for one connection attempt.
#[derive(Debug)]
pub struct NegotiationSession<C> {
    connector: C,
    state: SignalingState,
    role: Option<Role>,
}

impl<C: PeerConnector> NegotiationSession<C> {
    /// Create a session in `Idle` around a peer connector.
    #[must_use]
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            state: SignalingState::Idle,
            role: None,
        }
    }

    /// Current signaling state.
    #[must_use]
    pub fn state(&self) -> SignalingState {
        self.state
    }

    /// Role taken in the exchange, once known.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.role
    }

    /// Access the underlying connector.
    #[must_use]
    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Begin negotiation as the initiator.
    ///
    /// Produces and commits a local offer, then returns the offer envelope
    /// to emit through the relay.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] unless the session is `Idle`, and
    /// [`Error::NegotiationFailed`] if the connector rejects the offer.
    pub async fn start(&mut self) -> Result<SignalingEnvelope> {
        if self.state != SignalingState::Idle {
            return Err(Error::InvalidState {
                operation: "start negotiation",
                state: self.state,
            });
        }

        let offer = match self.connector.create_offer().await {
            Ok(offer) => offer,
            Err(err) => return Err(self.fail("create local offer", &err)),
        };
        if let Err(err) = self.connector.set_local_description(&offer).await {
            return Err(self.fail("commit local offer", &err));
        }

        self.role = Some(Role::Initiator);
        self.state = SignalingState::HaveLocalOffer;
        tracing::debug!("local offer committed, awaiting answer");

        Ok(SignalingEnvelope::Offer { offer })
    }

    /// Dispatch one envelope received from the relay.
    ///
    /// Returns the envelope to send back, if the exchange calls for one
    /// (an answer, when an offer was accepted). Offers and answers that
    /// arrive in a state that does not expect them are logged and ignored
    /// without touching session state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NegotiationFailed`] if the connector rejects a
    /// description; the session is left in `Failed`.
    pub async fn handle_envelope(
        &mut self,
        envelope: SignalingEnvelope,
    ) -> Result<Option<SignalingEnvelope>> {
        match envelope {
            SignalingEnvelope::Offer { offer } => Ok(self
                .handle_offer(offer)
                .await?
                .map(|answer| SignalingEnvelope::Answer { answer })),
            SignalingEnvelope::Answer { answer } => {
                self.handle_answer(&answer).await.map(|()| None)
            }
            SignalingEnvelope::Candidate { candidate } => {
                self.handle_candidate(&candidate).await;
                Ok(None)
            }
        }
    }

    /// Apply a manually exchanged connection bundle.
    ///
    /// An offer bundle is answered: the returned description is the local
    /// answer for the host to bundle with its own gathered candidates. An
    /// answer bundle completes the exchange and returns `None`.
    ///
    /// # Errors
    ///
    /// Same failure semantics as [`handle_envelope`](Self::handle_envelope).
    pub async fn handle_bundle(
        &mut self,
        bundle: &ConnectionBundle,
    ) -> Result<Option<SessionDescription>> {
        let reply = match bundle.description.kind {
            SdpKind::Offer => self.handle_offer(bundle.description.clone()).await?,
            SdpKind::Answer => {
                self.handle_answer(&bundle.description).await?;
                None
            }
        };

        for candidate in &bundle.candidates {
            self.handle_candidate(candidate).await;
        }

        Ok(reply)
    }

    /// Wrap a locally discovered candidate for relay emission.
    ///
    /// Candidates are pushed as the connector discovers them, before,
    /// during, or after the offer/answer exchange.
    #[must_use]
    pub fn local_candidate(&self, candidate: IceCandidate) -> SignalingEnvelope {
        SignalingEnvelope::Candidate { candidate }
    }

    async fn handle_offer(
        &mut self,
        offer: SessionDescription,
    ) -> Result<Option<SessionDescription>> {
        if self.state != SignalingState::Idle {
            tracing::warn!(state = ?self.state, "ignoring offer received outside Idle");
            return Ok(None);
        }

        self.role = Some(Role::Responder);
        self.state = SignalingState::HaveRemoteOffer;

        if let Err(err) = self.connector.set_remote_description(&offer).await {
            return Err(self.fail("apply remote offer", &err));
        }
        let answer = match self.connector.create_answer().await {
            Ok(answer) => answer,
            Err(err) => return Err(self.fail("create local answer", &err)),
        };
        if let Err(err) = self.connector.set_local_description(&answer).await {
            return Err(self.fail("commit local answer", &err));
        }

        self.state = SignalingState::Connected;
        tracing::debug!("remote offer answered, session connected");

        Ok(Some(answer))
    }

    async fn handle_answer(&mut self, answer: &SessionDescription) -> Result<()> {
        if self.state != SignalingState::HaveLocalOffer {
            tracing::warn!(state = ?self.state, "ignoring answer with no outstanding offer");
            return Ok(());
        }

        if let Err(err) = self.connector.set_remote_description(answer).await {
            return Err(self.fail("apply remote answer", &err));
        }

        self.state = SignalingState::Connected;
        tracing::debug!("remote answer applied, session connected");

        Ok(())
    }

    async fn handle_candidate(&mut self, candidate: &IceCandidate) {
        if self.state == SignalingState::Failed {
            tracing::warn!("dropping candidate for failed session");
            return;
        }

        // Candidate failures abort that candidate only.
        if let Err(err) = self.connector.add_remote_candidate(candidate).await {
            tracing::warn!(%err, "failed to queue remote candidate");
        }
    }

    fn fail(&mut self, context: &str, err: &Error) -> Error {
        self.state = SignalingState::Failed;
        tracing::error!(%err, context, "negotiation failed");
        Error::NegotiationFailed(format!("{context}: {err}"))
    }
}
