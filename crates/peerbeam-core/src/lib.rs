//! # Peerbeam Core Library
//!
//! `peerbeam-core` is the protocol engine behind Peerbeam, a relay-assisted
//! peer-to-peer file transfer tool. It drives the offer/answer/candidate
//! exchange that establishes a direct data channel between two endpoints,
//! then streams a single file over that channel as a metadata record
//! followed by bounded-size chunks.
//!
//! The engine is transport-agnostic: the rendezvous connection, the peer
//! channel, and file access are all supplied by the host application through
//! small traits ([`signaling::relay::RelayTransport`],
//! [`channel::PeerConnector`], [`channel::DataChannel`],
//! [`transfer::send::FileSource`]). Everything in between - signaling codec,
//! negotiation state machine, chunked framing, reassembly - lives here.
//!
//! ## Modules
//!
//! - [`channel`] - Peer channel abstraction (frames, events, connector)
//! - [`config`] - Configuration management
//! - [`error`] - Unified error type
//! - [`negotiation`] - Offer/answer/candidate state machine
//! - [`session`] - Per-connection dispatcher tying the pieces together
//! - [`signaling`] - Signaling envelopes, relay client, offline bundles
//! - [`transfer`] - Chunked file transfer (sender and receiver)
//!
//! ## Example
//!
//! ```rust,ignore
//! use peerbeam_core::channel::ChannelEvent;
//! use peerbeam_core::session::PeerSession;
//!
//! let mut session = PeerSession::new(connector);
//! let offer = session.start_negotiation().await?;
//! relay.send(&offer).await?;
//! while let Some(envelope) = relay.recv().await {
//!     if let Some(reply) = session.handle_relay_envelope(envelope).await {
//!         relay.send(&reply).await?;
//!     }
//! }
//! session.handle_channel_event(ChannelEvent::Open);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(async_fn_in_trait)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::len_without_is_empty)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]

pub mod channel;
pub mod config;
pub mod error;
pub mod negotiation;
pub mod session;
pub mod signaling;
pub mod transfer;

pub use error::{Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default chunk size for file transfers (16 KiB)
pub const DEFAULT_CHUNK_SIZE: usize = 16 * 1024;

/// Default STUN server offered to peer connectors
pub const DEFAULT_STUN_SERVER: &str = "stun:stun.l.google.com:19302";
