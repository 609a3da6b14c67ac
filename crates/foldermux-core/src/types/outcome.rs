//! Per-file operation results reported to the callback.

use std::fmt;

/// Outcome of processing a single file of the folder.
///
/// `Ok` and `ChecksumMismatch` come from a normal close. The remaining
/// variants are forced results handed to
/// [`FolderDemux::flush_corrupted`](crate::FolderDemux::flush_corrupted)
/// when the upstream decoder can no longer produce data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationResult {
    /// Content was complete and the checksum matched (or none was recorded).
    Ok,
    /// Content was complete but its CRC differs from the recorded one.
    ChecksumMismatch,
    /// The folder uses a coder the decoder does not support.
    UnsupportedMethod,
    /// The decoder reported corrupt data.
    DataError,
    /// The stream ended before every file received its bytes.
    UnexpectedEnd,
}

impl OperationResult {
    /// Returns `true` for [`OperationResult::Ok`].
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Returns `true` for results only produced by a corruption flush.
    #[must_use]
    pub const fn is_forced(self) -> bool {
        matches!(
            self,
            Self::UnsupportedMethod | Self::DataError | Self::UnexpectedEnd
        )
    }

    /// Returns a short machine-friendly name for the result.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::ChecksumMismatch => "checksum_mismatch",
            Self::UnsupportedMethod => "unsupported_method",
            Self::DataError => "data_error",
            Self::UnexpectedEnd => "unexpected_end",
        }
    }
}

impl fmt::Display for OperationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Ok => "ok",
            Self::ChecksumMismatch => "CRC mismatch",
            Self::UnsupportedMethod => "unsupported compression method",
            Self::DataError => "data error",
            Self::UnexpectedEnd => "unexpected end of data",
        };
        f.write_str(text)
    }
}
