//! Error conversion utilities for CLI.
//!
//! Converts foldermux-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use foldermux_core::CallbackError;
use foldermux_core::DemuxError;
use std::path::Path;

/// Converts `DemuxError` to user-friendly anyhow error with context
pub fn convert_demux_error(err: DemuxError, stream: &Path) -> anyhow::Error {
    match err {
        DemuxError::CallbackRejected {
            index,
            stage,
            source: CallbackError::Cancelled,
        } => anyhow!(
            "Processing of '{}' was cancelled at file #{index} ({stage})",
            stream.display()
        ),
        DemuxError::CallbackRejected {
            index,
            stage,
            source,
        } => anyhow!(
            "Could not handle file #{index} of '{}' during {stage}: {source}\n\
             HINT: Check that the output directory is writable and manifest names are relative paths.",
            stream.display()
        ),
        DemuxError::PrematureWrite { len } => anyhow!(
            "Stream '{}' holds {len} bytes past the last file\n\
             HINT: The manifest may not match this stream. Use --ignore-trailing to discard the surplus.",
            stream.display()
        ),
        DemuxError::Sink { index, source } => anyhow!(
            "Failed writing file #{index} from '{}': {source}\n\
             HINT: Check free disk space and permissions of the output directory.",
            stream.display()
        ),
        DemuxError::InvalidFolder(reason) => anyhow!(
            "Invalid folder for '{}': {reason}\n\
             HINT: Check start_index, count and ref2_offset in the manifest.",
            stream.display()
        ),
        DemuxError::Io(io_err) => anyhow!(
            "I/O error while processing '{}': {io_err}",
            stream.display()
        ),
    }
}

/// Adds context to a core result about the stream being processed
pub fn add_stream_context<T>(
    result: Result<T, DemuxError>,
    stream: &Path,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_demux_error(e, stream))
}
