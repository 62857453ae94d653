//! Receiver side of the transfer protocol.
//!
//! [`TransferAccumulator`] rebuilds the original file from the ordered
//! frame stream. The first frame opens the transfer as metadata; every
//! later frame is appended as a chunk. Once the accumulated byte count
//! reaches the announced size the chunks are concatenated into one
//! artifact, a completion event fires exactly once, and the accumulator
//! resets so a fresh metadata frame can open the next transfer on the same
//! channel.

use crate::channel::Frame;
use crate::error::{Error, Result};
use crate::transfer::{TransferMetadata, TransferProgress};

/// Receiver-side transfer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveState {
    /// No transfer in flight; the next frame is metadata
    AwaitingMetadata,
    /// Metadata processed; chunks accumulating
    Receiving,
}

/// A fully reassembled file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedFile {
    /// Decoded file name from the metadata record
    pub file_name: String,
    /// Complete file contents in send order
    pub bytes: Vec<u8>,
}

/// Event surfaced to the host while receiving.
#[derive(Debug, Clone, PartialEq)]
pub enum ReceiveEvent {
    /// Metadata processed; a transfer is now in flight
    Started {
        /// Decoded file name
        file_name: String,
        /// Announced size in bytes
        file_size: u64,
    },
    /// A chunk was appended
    Progress(TransferProgress),
    /// The transfer finished; the host owns the artifact now
    Completed(ReceivedFile),
}

/// Accumulator reassembling one transfer at a time.
///
/// Owned by exactly one peer channel; chunk order is the channel's
/// delivery order.
#[derive(Debug, Default)]
pub struct TransferAccumulator {
    incoming: Option<Incoming>,
}

#[derive(Debug)]
struct Incoming {
    file_name: String,
    expected: u64,
    received: u64,
    chunks: Vec<Vec<u8>>,
}

impl TransferAccumulator {
    /// Create an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current receive state.
    #[must_use]
    pub fn state(&self) -> ReceiveState {
        if self.incoming.is_some() {
            ReceiveState::Receiving
        } else {
            ReceiveState::AwaitingMetadata
        }
    }

    /// Progress of the in-flight transfer, if one is open.
    #[must_use]
    pub fn progress(&self) -> Option<TransferProgress> {
        self.incoming.as_ref().map(|incoming| TransferProgress {
            bytes_received: incoming.received,
            bytes_expected: incoming.expected,
        })
    }

    /// Process one frame from the peer channel.
    ///
    /// Returns the events the frame produced, in order. A zero-byte
    /// transfer completes on its metadata frame alone.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProtocolViolation`] for an unparseable metadata
    /// frame; the accumulator stays in `AwaitingMetadata` and the frame is
    /// dropped.
    pub fn handle_frame(&mut self, frame: Frame) -> Result<Vec<ReceiveEvent>> {
        let Some(incoming) = self.incoming.as_mut() else {
            return self.open_transfer(&frame);
        };

        let bytes = frame.into_bytes();
        incoming.received += bytes.len() as u64;
        incoming.chunks.push(bytes);

        let progress = TransferProgress {
            bytes_received: incoming.received,
            bytes_expected: incoming.expected,
        };
        tracing::debug!(
            received = incoming.received,
            expected = incoming.expected,
            "chunk appended"
        );

        let mut events = vec![ReceiveEvent::Progress(progress)];
        if incoming.received >= incoming.expected {
            if let Some(incoming) = self.incoming.take() {
                events.push(Self::finalize(incoming));
            }
        }
        Ok(events)
    }

    /// Drop any partially accumulated transfer.
    ///
    /// Called when the channel closes or errors; no partial artifact is
    /// ever emitted.
    pub fn discard(&mut self) {
        if let Some(incoming) = self.incoming.take() {
            tracing::warn!(
                file = %incoming.file_name,
                received = incoming.received,
                expected = incoming.expected,
                "discarding partial transfer"
            );
        }
    }

    fn open_transfer(&mut self, frame: &Frame) -> Result<Vec<ReceiveEvent>> {
        let text = match frame {
            Frame::Text(text) => text.clone(),
            Frame::Binary(bytes) => String::from_utf8(bytes.clone()).map_err(|_| {
                Error::ProtocolViolation("metadata frame is not valid UTF-8".to_string())
            })?,
        };
        let metadata = TransferMetadata::decode(&text)?;

        tracing::debug!(
            file = %metadata.file_name,
            size = metadata.file_size,
            "transfer opened"
        );

        let incoming = Incoming {
            file_name: metadata.file_name.clone(),
            expected: metadata.file_size,
            received: 0,
            chunks: Vec::new(),
        };
        let mut events = vec![ReceiveEvent::Started {
            file_name: metadata.file_name,
            file_size: metadata.file_size,
        }];

        if incoming.expected == 0 {
            events.push(Self::finalize(incoming));
        } else {
            self.incoming = Some(incoming);
        }
        Ok(events)
    }

    fn finalize(incoming: Incoming) -> ReceiveEvent {
        tracing::debug!(
            file = %incoming.file_name,
            bytes = incoming.received,
            "transfer complete"
        );

        ReceiveEvent::Completed(ReceivedFile {
            file_name: incoming.file_name,
            bytes: incoming.chunks.concat(),
        })
    }
}
