//! High-level API for driving a folder from a byte source.

use std::io::Read;

use tracing::debug;
use tracing::warn;

use crate::DemuxConfig;
use crate::FolderDemux;
use crate::FolderTable;
use crate::Result;
use crate::callback::ExtractCallback;
use crate::copy::CopyBuffer;
use crate::copy::PumpEnd;
use crate::copy::pump;
use crate::report::FolderStatus;
use crate::report::FolderSummary;
use crate::types::OperationResult;

/// Splits a decompressed folder stream into its files.
///
/// Reads `reader` until every file of `table` has its bytes. If the source
/// ends early, every unfinished file is reported as
/// [`OperationResult::UnexpectedEnd`]; if reading fails, as
/// [`OperationResult::DataError`]. Either way each file receives exactly one
/// result and the summary's status says what happened.
///
/// Bytes past the last file are handled by the configured
/// [`PrematureWritePolicy`](crate::PrematureWritePolicy).
///
/// # Errors
///
/// Returns an error if the callback rejects a call, a destination write
/// fails, or surplus bytes are rejected.
///
/// # Examples
///
/// ```
/// use foldermux_core::DemuxConfig;
/// use foldermux_core::FileDescriptor;
/// use foldermux_core::FolderStatus;
/// use foldermux_core::FolderTable;
/// use foldermux_core::callbacks::MemoryCallback;
/// use foldermux_core::extract_folder;
///
/// # fn main() -> foldermux_core::Result<()> {
/// let files = [FileDescriptor::file(3, None), FileDescriptor::file(3, None)];
/// let table = FolderTable::new(&files, 0, &[true, true], false)?;
/// let mut callback = MemoryCallback::new();
///
/// let summary = extract_folder(&mut &b"abcd"[..], table, &mut callback, &DemuxConfig::default())?;
/// assert_eq!(summary.status, FolderStatus::Truncated);
/// assert_eq!(callback.report().forced_failures(), 1);
/// # Ok(())
/// # }
/// ```
pub fn extract_folder<R: Read, C: ExtractCallback>(
    reader: &mut R,
    table: FolderTable<'_>,
    callback: C,
    config: &DemuxConfig,
) -> Result<FolderSummary> {
    let files = table.len();
    let mut demux = FolderDemux::new(table, callback, config.clone())?;
    let mut buffer = CopyBuffer::new();

    let (status, error) = match pump(reader, &mut demux, &mut buffer)? {
        PumpEnd::Complete => (FolderStatus::Complete, None),
        PumpEnd::Eof => {
            warn!(
                consumed = demux.bytes_consumed(),
                declared = demux.table().declared_bytes(),
                "folder stream ended early"
            );
            demux.flush_corrupted(OperationResult::UnexpectedEnd)?;
            (FolderStatus::Truncated, None)
        }
        PumpEnd::ReadError(err) => {
            warn!(error = %err, "folder stream failed");
            demux.flush_corrupted(OperationResult::DataError)?;
            (FolderStatus::Corrupted, Some(err.to_string()))
        }
    };

    let summary = FolderSummary {
        status,
        files,
        bytes_consumed: demux.bytes_consumed(),
        bytes_forwarded: demux.bytes_forwarded(),
        error,
    };
    debug!(
        status = %summary.status,
        files,
        bytes = summary.bytes_consumed,
        "folder finished"
    );
    Ok(summary)
}
