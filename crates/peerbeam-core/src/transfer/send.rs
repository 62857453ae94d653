//! Sender side of the transfer protocol.
//!
//! [`send_file`] streams one file as a metadata frame followed by
//! sequential chunk frames. Sends are strictly serial: the next window is
//! read only after the previous send resolved, which preserves chunk order
//! without sequence numbers. The sender never waits for acknowledgements;
//! once the last byte is on the channel it is done.

use std::path::Path;

use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::channel::{DataChannel, Frame};
use crate::error::{Error, Result};
use crate::transfer::TransferMetadata;

/// Byte-range read access to the file being sent.
pub trait FileSource {
    /// File name announced in the metadata frame.
    fn name(&self) -> &str;

    /// Total size in bytes.
    fn size(&self) -> u64;

    /// Read exactly `len` bytes starting at `offset`.
    ///
    /// Callers never request past the end of the file.
    async fn read_range(&mut self, offset: u64, len: usize) -> Result<Vec<u8>>;
}

/// File source over an in-memory byte buffer.
#[derive(Debug, Clone)]
pub struct MemorySource {
    name: String,
    bytes: Vec<u8>,
}

impl MemorySource {
    /// Create a source from a name and its contents.
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

impl FileSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    async fn read_range(&mut self, offset: u64, len: usize) -> Result<Vec<u8>> {
        let start = usize::try_from(offset)
            .map_err(|_| Error::ProtocolViolation(format!("offset out of range: {offset}")))?;
        let end = start.checked_add(len).filter(|end| *end <= self.bytes.len());
        let Some(end) = end else {
            return Err(Error::ProtocolViolation(format!(
                "read past end of source: {offset}+{len}"
            )));
        };
        Ok(self.bytes[start..end].to_vec())
    }
}

/// File source over a file on disk.
#[derive(Debug)]
pub struct DiskSource {
    name: String,
    size: u64,
    file: tokio::fs::File,
}

impl DiskSource {
    /// Open a file for sending.
    ///
    /// The announced name is the path's final component.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or its metadata read.
    pub async fn open(path: &Path) -> Result<Self> {
        let file = tokio::fs::File::open(path).await?;
        let size = file.metadata().await?.len();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unnamed")
            .to_string();

        Ok(Self { name, size, file })
    }
}

impl FileSource for DiskSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.size
    }

    async fn read_range(&mut self, offset: u64, len: usize) -> Result<Vec<u8>> {
        self.file.seek(std::io::SeekFrom::Start(offset)).await?;
        let mut buffer = vec![0u8; len];
        self.file.read_exact(&mut buffer).await?;
        Ok(buffer)
    }
}

/// What a completed send looked like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendSummary {
    /// Chunk frames emitted after the metadata frame
    pub chunk_frames: u64,
    /// Total payload bytes sent, equal to the file size
    pub bytes_sent: u64,
}

/// Stream one file over an open data channel.
///
/// Emits the metadata text frame, then `ceil(size / chunk_size)` binary
/// chunk frames in order. A zero-byte file emits the metadata frame alone.
///
/// # Errors
///
/// Returns [`Error::InvalidConfig`] for a zero chunk size, and any source
/// read or channel send error as-is. A failed send abandons the transfer;
/// nothing is retried.
pub async fn send_file<S, D>(source: &mut S, channel: &mut D, chunk_size: usize) -> Result<SendSummary>
where
    S: FileSource,
    D: DataChannel,
{
    if chunk_size == 0 {
        return Err(Error::InvalidConfig {
            key: "chunk_size".to_string(),
            reason: "must be at least 1 byte".to_string(),
        });
    }

    let total = source.size();
    let metadata = TransferMetadata {
        file_name: source.name().to_string(),
        file_size: total,
    };

    tracing::debug!(
        file = %metadata.file_name,
        size = total,
        chunk_size,
        "starting file send"
    );
    channel.send(Frame::Text(metadata.encode())).await?;

    let mut offset: u64 = 0;
    let mut chunk_frames: u64 = 0;

    while offset < total {
        #[allow(clippy::cast_possible_truncation)]
        let len = (total - offset).min(chunk_size as u64) as usize;
        let data = source.read_range(offset, len).await?;
        if data.len() != len {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("source returned {} bytes, wanted {len}", data.len()),
            )));
        }

        channel.send(Frame::Binary(data)).await?;
        offset += len as u64;
        chunk_frames += 1;
    }

    tracing::debug!(file = %metadata.file_name, chunk_frames, "file send finished");

    Ok(SendSummary {
        chunk_frames,
        bytes_sent: total,
    })
}
