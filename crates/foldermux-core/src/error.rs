//! Error types for folder demultiplexing.

use crate::callback::CallbackError;
use crate::callback::CallbackStage;
use thiserror::Error;

/// Result type alias using `DemuxError`.
pub type Result<T> = std::result::Result<T, DemuxError>;

/// Errors that can occur while routing a folder stream.
///
/// A checksum mismatch is deliberately absent: it is a per-file
/// [`OperationResult`](crate::OperationResult) reported to the callback,
/// and processing continues with the next file.
#[derive(Error, Debug)]
pub enum DemuxError {
    /// The extraction callback returned a non-success signal.
    #[error("callback rejected {stage} for file #{index}: {source}")]
    CallbackRejected {
        /// Global index of the file being processed.
        index: u32,
        /// Callback operation that failed.
        stage: CallbackStage,
        /// Error returned by the callback.
        #[source]
        source: CallbackError,
    },

    /// Bytes were written after every file of the folder was accounted for.
    #[error("{len} bytes written after the folder was complete")]
    PrematureWrite {
        /// Number of bytes that could not be routed.
        len: usize,
    },

    /// Writing to the destination sink failed.
    #[error("failed to write file #{index}: {source}")]
    Sink {
        /// Global index of the file being written.
        index: u32,
        /// Underlying I/O error, unchanged.
        #[source]
        source: std::io::Error,
    },

    /// The folder table describes an impossible range.
    #[error("invalid folder: {0}")]
    InvalidFolder(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DemuxError {
    /// Returns the global file index the error relates to, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use foldermux_core::DemuxError;
    ///
    /// let err = DemuxError::Sink {
    ///     index: 7,
    ///     source: std::io::Error::other("disk full"),
    /// };
    /// assert_eq!(err.index(), Some(7));
    ///
    /// let err = DemuxError::PrematureWrite { len: 3 };
    /// assert_eq!(err.index(), None);
    /// ```
    #[must_use]
    pub const fn index(&self) -> Option<u32> {
        match self {
            Self::CallbackRejected { index, .. } | Self::Sink { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// Returns `true` if the error aborts the whole folder.
    ///
    /// Only a premature write leaves the demultiplexer usable: it is
    /// rejected before any state is touched.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::PrematureWrite { .. })
    }

    /// Returns `true` if the callback asked to stop the operation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(
            self,
            Self::CallbackRejected {
                source: CallbackError::Cancelled,
                ..
            }
        )
    }
}
