//! Signaling message types and codec.
//!
//! Peers exchange connection-setup metadata through a rendezvous relay as
//! JSON text messages. Each message is one envelope:
//!
//! ```text
//! {"type":"offer","offer":{"kind":"offer","sdp":"..."}}
//! {"type":"answer","answer":{"kind":"answer","sdp":"..."}}
//! {"type":"candidate","candidate":{"candidate":"...","sdpMid":"0","sdpMLineIndex":0}}
//! ```
//!
//! An envelope is immutable once sent and consumed exactly once by the
//! peer's negotiation session. Messages with an unrecognized `type` decode
//! to [`Error::UnknownMessage`]; the relay client logs and drops them
//! without touching session state.

pub mod bundle;
pub mod relay;

pub use bundle::ConnectionBundle;
pub use relay::{MemoryTransport, RelayClient, RelayTransport};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Which half of the offer/answer exchange a description belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpKind {
    /// Proposes capabilities to the remote peer
    Offer,
    /// Accepts or counters a received offer
    Answer,
}

/// An opaque session description produced by a peer connector.
///
/// The engine never inspects the `sdp` payload; it only routes it between
/// the relay and the connector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescription {
    /// Offer or answer
    pub kind: SdpKind,
    /// Serialized description body
    pub sdp: String,
}

impl SessionDescription {
    /// Create an offer description.
    #[must_use]
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Offer,
            sdp: sdp.into(),
        }
    }

    /// Create an answer description.
    #[must_use]
    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Answer,
            sdp: sdp.into(),
        }
    }
}

/// One connectivity candidate discovered for the direct peer channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceCandidate {
    /// Candidate line
    pub candidate: String,
    /// Media stream identification tag
    #[serde(rename = "sdpMid", skip_serializing_if = "Option::is_none", default)]
    pub sdp_mid: Option<String>,
    /// Media description index
    #[serde(
        rename = "sdpMLineIndex",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub sdp_mline_index: Option<u16>,
}

impl IceCandidate {
    /// Create a candidate with just a candidate line.
    #[must_use]
    pub fn new(candidate: impl Into<String>) -> Self {
        Self {
            candidate: candidate.into(),
            sdp_mid: None,
            sdp_mline_index: None,
        }
    }
}

/// A signaling message exchanged through the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SignalingEnvelope {
    /// Session description proposing capabilities
    Offer {
        /// The proposed description
        offer: SessionDescription,
    },
    /// Session description accepting an offer
    Answer {
        /// The accepting description
        answer: SessionDescription,
    },
    /// Connectivity candidate, pushed as discovered
    Candidate {
        /// The discovered candidate
        candidate: IceCandidate,
    },
}

impl SignalingEnvelope {
    /// Short tag for log fields.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Offer { .. } => "offer",
            Self::Answer { .. } => "answer",
            Self::Candidate { .. } => "candidate",
        }
    }
}

/// Encode an envelope to its JSON wire form.
pub fn encode(envelope: &SignalingEnvelope) -> Result<String> {
    serde_json::to_string(envelope).map_err(|e| Error::Serialization(e.to_string()))
}

/// Decode an envelope from its JSON wire form.
///
/// # Errors
///
/// Returns [`Error::UnknownMessage`] if the message carries a `type` tag
/// the protocol does not define, and [`Error::ProtocolViolation`] for
/// anything else that fails to parse.
pub fn decode(text: &str) -> Result<SignalingEnvelope> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| Error::ProtocolViolation(e.to_string()))?;

    match serde_json::from_value(value.clone()) {
        Ok(envelope) => Ok(envelope),
        Err(e) => match value.get("type").and_then(serde_json::Value::as_str) {
            Some(tag) if !matches!(tag, "offer" | "answer" | "candidate") => {
                Err(Error::UnknownMessage(tag.to_string()))
            }
            _ => Err(Error::ProtocolViolation(e.to_string())),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offer_wire_shape() {
        let envelope = SignalingEnvelope::Offer {
            offer: SessionDescription::offer("v=0"),
        };

        let text = encode(&envelope).expect("encode");
        assert_eq!(text, r#"{"type":"offer","offer":{"kind":"offer","sdp":"v=0"}}"#);

        let decoded = decode(&text).expect("decode");
        assert_eq!(decoded, envelope);
    }

    #[test]
    fn test_candidate_wire_shape() {
        let envelope = SignalingEnvelope::Candidate {
            candidate: IceCandidate {
                candidate: "candidate:0 1 UDP 2122252543 192.0.2.1 54400 typ host".to_string(),
                sdp_mid: Some("0".to_string()),
                sdp_mline_index: Some(0),
            },
        };

        let text = encode(&envelope).expect("encode");
        assert!(text.contains(r#""type":"candidate""#));
        assert!(text.contains(r#""sdpMid":"0""#));
        assert!(text.contains(r#""sdpMLineIndex":0"#));

        let decoded = decode(&text).expect("decode");
        assert_eq!(decoded, envelope);
    }

    #[test]
    fn test_candidate_optional_fields_omitted() {
        let envelope = SignalingEnvelope::Candidate {
            candidate: IceCandidate::new("candidate:1"),
        };

        let text = encode(&envelope).expect("encode");
        assert!(!text.contains("sdpMid"));
        assert!(!text.contains("sdpMLineIndex"));

        let decoded = decode(&text).expect("decode");
        assert_eq!(decoded, envelope);
    }

    #[test]
    fn test_unknown_type_rejected() {
        let result = decode(r#"{"type":"bye","reason":"done"}"#);
        match result {
            Err(Error::UnknownMessage(tag)) => assert_eq!(tag, "bye"),
            other => panic!("expected UnknownMessage, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_json_rejected() {
        let result = decode("not json");
        assert!(matches!(result, Err(Error::ProtocolViolation(_))));
    }

    #[test]
    fn test_missing_payload_rejected() {
        let result = decode(r#"{"type":"offer"}"#);
        assert!(matches!(result, Err(Error::ProtocolViolation(_))));
    }

    #[test]
    fn test_envelope_kind() {
        let offer = SignalingEnvelope::Offer {
            offer: SessionDescription::offer("x"),
        };
        let answer = SignalingEnvelope::Answer {
            answer: SessionDescription::answer("x"),
        };
        let candidate = SignalingEnvelope::Candidate {
            candidate: IceCandidate::new("x"),
        };

        assert_eq!(offer.kind(), "offer");
        assert_eq!(answer.kind(), "answer");
        assert_eq!(candidate.kind(), "candidate");
    }
}
