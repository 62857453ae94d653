//! Offline connection bundles.
//!
//! When no relay is reachable, two peers can still pair by exchanging a
//! single copy-pasteable string per direction: a base64-encoded JSON blob
//! carrying one session description together with every candidate gathered
//! so far. The initiator shares an offer bundle, the responder replies
//! with an answer bundle, and the channel comes up with no rendezvous
//! service involved.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::signaling::{IceCandidate, SessionDescription};

/// A self-contained signaling payload for manual exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionBundle {
    /// The offer or answer description
    pub description: SessionDescription,
    /// Candidates gathered before the bundle was built
    pub candidates: Vec<IceCandidate>,
}

impl ConnectionBundle {
    /// Bundle a description with the candidates gathered so far.
    #[must_use]
    pub fn new(description: SessionDescription, candidates: Vec<IceCandidate>) -> Self {
        Self {
            description,
            candidates,
        }
    }

    /// Encode to a copy-pasteable base64 string.
    pub fn encode(&self) -> Result<String> {
        let json = serde_json::to_vec(self).map_err(|e| Error::Serialization(e.to_string()))?;
        Ok(STANDARD.encode(json))
    }

    /// Decode from a base64 string produced by [`encode`](Self::encode).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBundle`] naming the layer that failed:
    /// base64, UTF-8, or the JSON structure itself.
    pub fn decode(input: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(input.trim())
            .map_err(|_| Error::InvalidBundle("not valid base64".to_string()))?;

        let json = std::str::from_utf8(&bytes)
            .map_err(|_| Error::InvalidBundle("not valid UTF-8".to_string()))?;

        serde_json::from_str(json)
            .map_err(|e| Error::InvalidBundle(format!("malformed bundle JSON: {e}")))
    }
}
