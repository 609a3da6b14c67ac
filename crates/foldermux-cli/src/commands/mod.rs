//! Command implementations.

pub mod completion;
pub mod list;
pub mod split;
pub mod verify;

use crate::manifest::Manifest;
use crate::output::OutputFormatter;
use foldermux_core::FolderStatus;
use foldermux_core::FolderSummary;

/// Warns about a folder that could not be read to its end.
fn warn_incomplete(formatter: &dyn OutputFormatter, manifest: &Manifest, summary: &FolderSummary) {
    match summary.status {
        FolderStatus::Complete => {}
        FolderStatus::Truncated => formatter.format_warning(&format!(
            "stream ended after {} of {} declared bytes",
            summary.bytes_consumed,
            manifest.folder_bytes()
        )),
        FolderStatus::Corrupted => formatter.format_warning(&format!(
            "stream read failed after {} bytes: {}",
            summary.bytes_consumed,
            summary.error.as_deref().unwrap_or("unknown error")
        )),
    }
}
