//! Folder processing reports.

use std::fmt;

use crate::types::ExtractMode;
use crate::types::OperationResult;

/// Outcome of one file, as seen by a callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileRecord {
    /// Global index of the file.
    pub index: u32,
    /// Effective mode announced through `begin_operation`.
    pub mode: ExtractMode,
    /// Reported result.
    pub result: OperationResult,
    /// Bytes stored by the callback for this file.
    pub bytes: u64,
}

/// Per-file ledger kept by the bundled callbacks.
///
/// Holds exactly one record per reported file, in report order.
#[derive(Debug, Clone, Default)]
pub struct FolderReport {
    records: Vec<FileRecord>,
}

impl FolderReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the record of a finished file.
    pub fn record(&mut self, record: FileRecord) {
        self.records.push(record);
    }

    /// All records in report order.
    #[must_use]
    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    /// Number of files reported.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if nothing was reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record for a global index, if reported.
    #[must_use]
    pub fn get(&self, index: u32) -> Option<&FileRecord> {
        self.records.iter().find(|r| r.index == index)
    }

    /// Files extracted with an `Ok` result.
    #[must_use]
    pub fn files_extracted(&self) -> usize {
        self.count(|r| r.mode == ExtractMode::Extract && r.result.is_ok())
    }

    /// Files tested with an `Ok` result.
    #[must_use]
    pub fn files_tested(&self) -> usize {
        self.count(|r| r.mode == ExtractMode::Test && r.result.is_ok())
    }

    /// Files skipped (including downgraded ones).
    #[must_use]
    pub fn files_skipped(&self) -> usize {
        self.count(|r| r.mode == ExtractMode::Skip)
    }

    /// Files whose CRC did not match.
    #[must_use]
    pub fn checksum_mismatches(&self) -> usize {
        self.count(|r| r.result == OperationResult::ChecksumMismatch)
    }

    /// Files closed by a corruption flush.
    #[must_use]
    pub fn forced_failures(&self) -> usize {
        self.count(|r| r.result.is_forced())
    }

    /// Total bytes stored across all files.
    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.records.iter().map(|r| r.bytes).sum()
    }

    /// Returns `true` if every reported file is `Ok`.
    #[must_use]
    pub fn all_ok(&self) -> bool {
        self.records.iter().all(|r| r.result.is_ok())
    }

    /// Global indices of files with a non-`Ok` result.
    #[must_use]
    pub fn failed_indices(&self) -> Vec<u32> {
        self.records
            .iter()
            .filter(|r| !r.result.is_ok())
            .map(|r| r.index)
            .collect()
    }

    fn count(&self, pred: impl Fn(&FileRecord) -> bool) -> usize {
        self.records.iter().filter(|r| pred(r)).count()
    }
}

/// How a driven folder ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderStatus {
    /// Every file received its bytes.
    Complete,
    /// The source ended early; the rest was flushed as `UnexpectedEnd`.
    Truncated,
    /// The source failed; the rest was flushed as `DataError`.
    Corrupted,
}

impl fmt::Display for FolderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Complete => "complete",
            Self::Truncated => "truncated",
            Self::Corrupted => "corrupted",
        })
    }
}

/// Summary returned by [`extract_folder`](crate::extract_folder).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderSummary {
    /// How the folder ended.
    pub status: FolderStatus,
    /// Number of files in the folder.
    pub files: u32,
    /// Bytes read from the source and routed.
    pub bytes_consumed: u64,
    /// Bytes handed to callback-supplied sinks.
    pub bytes_forwarded: u64,
    /// Source error message for a corrupted folder.
    pub error: Option<String>,
}

impl FolderSummary {
    /// Returns `true` if the folder was fully read.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.status == FolderStatus::Complete
    }
}
