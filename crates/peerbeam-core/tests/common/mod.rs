//! Common test utilities for Peerbeam integration tests.
//!
//! This module provides a loopback peer connector and small helpers shared
//! across integration tests.

use peerbeam_core::channel::PeerConnector;
use peerbeam_core::error::Result;
use peerbeam_core::signaling::{IceCandidate, SessionDescription};

/// Peer connector that fabricates descriptions and records everything it
/// is handed, standing in for a real negotiation library.
#[derive(Debug)]
pub struct LoopbackConnector {
    label: &'static str,
    pub local: Option<SessionDescription>,
    pub remote: Option<SessionDescription>,
    pub candidates: Vec<IceCandidate>,
}

impl LoopbackConnector {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            local: None,
            remote: None,
            candidates: Vec::new(),
        }
    }
}

impl PeerConnector for LoopbackConnector {
    async fn create_offer(&mut self) -> Result<SessionDescription> {
        Ok(SessionDescription::offer(format!("v=0 o={} offer", self.label)))
    }

    async fn create_answer(&mut self) -> Result<SessionDescription> {
        Ok(SessionDescription::answer(format!(
            "v=0 o={} answer",
            self.label
        )))
    }

    async fn set_local_description(&mut self, description: &SessionDescription) -> Result<()> {
        self.local = Some(description.clone());
        Ok(())
    }

    async fn set_remote_description(&mut self, description: &SessionDescription) -> Result<()> {
        self.remote = Some(description.clone());
        Ok(())
    }

    async fn add_remote_candidate(&mut self, candidate: &IceCandidate) -> Result<()> {
        self.candidates.push(candidate.clone());
        Ok(())
    }
}

/// Generate deterministic content of the given size.
pub fn patterned_bytes(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 251) as u8).collect()
}

/// A host-side candidate line as a connector would discover it.
pub fn host_candidate(n: u16) -> IceCandidate {
    IceCandidate {
        candidate: format!("candidate:{n} 1 UDP 2122252543 192.0.2.{n} 54400 typ host"),
        sdp_mid: Some("0".to_string()),
        sdp_mline_index: Some(0),
    }
}
