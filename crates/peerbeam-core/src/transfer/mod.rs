//! Chunked file transfer over an established peer channel.
//!
//! A transfer is one metadata record followed by the file body in
//! bounded-size chunks:
//!
//! ```text
//! frame 0:     text    "<percent-encoded-name>|<decimal-byte-size>"
//! frames 1..N: binary  chunk, at most the configured chunk size each
//! ```
//!
//! There are no length prefixes and no chunk sequence numbers. Frame
//! boundaries come from the channel's own message boundaries, and chunk
//! ordering relies on the channel being reliable and ordered. If a host
//! ever runs this protocol over an unordered transport, chunk frames need
//! explicit sequence numbers first.
//!
//! The file name is percent-encoded with the same unreserved set browsers
//! use for URI components, so a name containing the `|` delimiter or
//! non-ASCII characters survives the trip byte-for-byte.

pub mod recv;
pub mod send;

pub use recv::{ReceiveEvent, ReceiveState, ReceivedFile, TransferAccumulator};
pub use send::{send_file, DiskSource, FileSource, MemorySource, SendSummary};

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::{Error, Result};

/// Delimiter between the encoded file name and the byte size.
pub const METADATA_DELIMITER: char = '|';

/// Escape set for file names: everything except ASCII alphanumerics and
/// the unreserved marks `- _ . ! ~ * ' ( )`.
const FILE_NAME_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Metadata record opening a transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferMetadata {
    /// Original (decoded) file name
    pub file_name: String,
    /// File size in bytes
    pub file_size: u64,
}

impl TransferMetadata {
    /// Encode to the wire form `<encoded-name>|<size>`.
    #[must_use]
    pub fn encode(&self) -> String {
        format!(
            "{}{}{}",
            utf8_percent_encode(&self.file_name, FILE_NAME_ESCAPE),
            METADATA_DELIMITER,
            self.file_size
        )
    }

    /// Decode from the wire form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProtocolViolation`] unless the frame splits into
    /// exactly a name part and a size part, the name percent-decodes to
    /// valid UTF-8, and the size parses as a non-negative integer.
    pub fn decode(frame: &str) -> Result<Self> {
        let parts: Vec<&str> = frame.split(METADATA_DELIMITER).collect();
        let [encoded_name, size] = parts.as_slice() else {
            return Err(Error::ProtocolViolation(format!(
                "metadata frame must be <name>{METADATA_DELIMITER}<size>, got {} part(s)",
                parts.len()
            )));
        };

        let file_name = percent_decode_str(encoded_name)
            .decode_utf8()
            .map_err(|_| {
                Error::ProtocolViolation("file name does not decode to UTF-8".to_string())
            })?
            .into_owned();

        let file_size = size.parse::<u64>().map_err(|_| {
            Error::ProtocolViolation(format!("unparseable file size: {size:?}"))
        })?;

        Ok(Self {
            file_name,
            file_size,
        })
    }
}

/// Progress of one transfer, observational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    /// Bytes accumulated so far
    pub bytes_received: u64,
    /// Expected total from the metadata record
    pub bytes_expected: u64,
}

impl TransferProgress {
    /// Progress as a percentage (0.0 - 100.0).
    ///
    /// A zero-byte transfer reports 100% as soon as it exists.
    #[must_use]
    pub fn percentage(&self) -> f64 {
        if self.bytes_expected == 0 {
            100.0
        } else {
            (self.bytes_received as f64 / self.bytes_expected as f64) * 100.0
        }
    }
}
