//! Error types for Peerbeam.
//!
//! This module provides a unified error type for all engine operations,
//! with specific variants for the three failure classes the engine
//! distinguishes: protocol violations (per-message, non-fatal),
//! negotiation failures (fatal to one session), and transport failures
//! (fatal to one transfer).

use std::io;

use thiserror::Error;

use crate::negotiation::SignalingState;

/// A specialized `Result` type for Peerbeam operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Peerbeam.
#[derive(Error, Debug)]
pub enum Error {
    /// Operation attempted in a signaling state that does not allow it
    #[error("cannot {operation} while in state {state:?}")]
    InvalidState {
        /// The operation that was attempted
        operation: &'static str,
        /// The state the session was in
        state: SignalingState,
    },

    /// Applying a remote description or creating a local one failed
    #[error("negotiation failed: {0}")]
    NegotiationFailed(String),

    /// Malformed message or frame
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    /// Signaling message with an unrecognized type tag
    #[error("unknown signaling message type: {0}")]
    UnknownMessage(String),

    /// Transfer operation attempted before the data channel opened
    #[error("data channel is not open")]
    ChannelNotOpen,

    /// Data channel closed while a frame was being sent
    #[error("data channel closed")]
    ChannelClosed,

    /// Relay connection closed while a message was being sent
    #[error("relay connection closed")]
    RelayClosed,

    /// Connection bundle could not be decoded
    #[error("invalid connection bundle: {0}")]
    InvalidBundle(String),

    /// Invalid configuration value
    #[error("invalid configuration value for '{key}': {reason}")]
    InvalidConfig {
        /// Configuration key
        key: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Returns whether this error is a per-message protocol violation.
    ///
    /// Protocol violations abort handling of the offending message only;
    /// the session keeps its state and the dispatcher keeps running.
    /// All other variants fail the operation they came from.
    #[must_use]
    pub const fn is_protocol_violation(&self) -> bool {
        matches!(self, Self::ProtocolViolation(_) | Self::UnknownMessage(_))
    }
}
