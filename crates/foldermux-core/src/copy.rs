//! Chunked pumping of a folder stream into the demultiplexer.

use std::io;
use std::io::Read;

use tracing::debug;

use crate::FolderDemux;
use crate::PrematureWritePolicy;
use crate::Result;
use crate::callback::ExtractCallback;

/// Size of one read from the folder stream (64KB).
const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Reusable read buffer for pumping folder streams.
#[derive(Debug)]
pub struct CopyBuffer {
    buf: Box<[u8]>,
}

impl CopyBuffer {
    /// Creates a zeroed buffer of the default size.
    #[must_use]
    pub fn new() -> Self {
        Self::with_size(COPY_BUFFER_SIZE)
    }

    /// Creates a zeroed buffer of `size` bytes (at least one).
    #[must_use]
    pub fn with_size(size: usize) -> Self {
        Self {
            buf: vec![0u8; size.max(1)].into_boxed_slice(),
        }
    }

    /// Returns the buffer size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.buf.len()
    }
}

impl Default for CopyBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// How a pump ended.
#[derive(Debug)]
pub enum PumpEnd {
    /// The folder completed.
    Complete,
    /// The source hit EOF before the folder completed.
    Eof,
    /// Reading the source failed.
    ReadError(io::Error),
}

/// Reads `reader` into `demux` until the folder completes or the source
/// stops.
///
/// Once the folder is complete under [`PrematureWritePolicy::Reject`], the
/// source is read one more time; anything it still yields is handed to the
/// demultiplexer and rejected, however the source splits its reads. Read
/// errors are returned as [`PumpEnd::ReadError`] rather than as an `Err`,
/// since the caller still has to account for the remaining files.
///
/// # Errors
///
/// Returns demultiplexer errors (callback rejections, sink failures,
/// rejected trailing bytes).
pub fn pump<R: Read, C: ExtractCallback>(
    reader: &mut R,
    demux: &mut FolderDemux<'_, C>,
    buffer: &mut CopyBuffer,
) -> Result<PumpEnd> {
    while !demux.is_complete() {
        let bytes_read = match reader.read(&mut buffer.buf) {
            Ok(0) => return Ok(PumpEnd::Eof),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Ok(PumpEnd::ReadError(e)),
        };

        let chunk = &buffer.buf[..bytes_read];
        let consumed = demux.write_bytes(chunk)?;
        if consumed < bytes_read {
            // surplus after the last file: hand it to the policy
            demux.write_bytes(&chunk[consumed..])?;
        }
    }

    if demux.config().premature_writes == PrematureWritePolicy::Reject {
        check_trailing(reader, demux, buffer)?;
    }
    Ok(PumpEnd::Complete)
}

/// Reads once past a complete folder and offers any bytes to the policy.
fn check_trailing<R: Read, C: ExtractCallback>(
    reader: &mut R,
    demux: &mut FolderDemux<'_, C>,
    buffer: &mut CopyBuffer,
) -> Result<()> {
    loop {
        match reader.read(&mut buffer.buf) {
            Ok(0) => return Ok(()),
            Ok(n) => {
                demux.write_bytes(&buffer.buf[..n])?;
                return Ok(());
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            // every file already has its result
            Err(e) => {
                debug!(error = %e, "read past the folder end failed");
                return Ok(());
            }
        }
    }
}
