//! Demultiplexer configuration.

use std::path::Path;
use std::path::PathBuf;

/// What to do with bytes offered after the folder is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrematureWritePolicy {
    /// Fail the write with [`DemuxError::PrematureWrite`](crate::DemuxError::PrematureWrite).
    #[default]
    Reject,
    /// Accept and discard the bytes, logging a warning.
    Ignore,
}

/// Configuration for a folder demultiplexer.
///
/// The per-file decisions and the global index offset belong to the
/// [`FolderTable`](crate::FolderTable); this struct only carries settings
/// that do not depend on archive metadata.
///
/// # Examples
///
/// ```
/// use foldermux_core::DemuxConfig;
/// use foldermux_core::PrematureWritePolicy;
///
/// let config = DemuxConfig::default()
///     .with_target_dir("/tmp/out")
///     .with_premature_writes(PrematureWritePolicy::Ignore);
///
/// assert_eq!(config.target_dir().unwrap().to_str(), Some("/tmp/out"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DemuxConfig {
    /// Directory passed to the callback with every sink request.
    pub target_dir: Option<PathBuf>,

    /// Handling of bytes that arrive after the last file closed.
    pub premature_writes: PrematureWritePolicy,
}

impl DemuxConfig {
    /// Sets the target directory passed to the callback.
    #[must_use]
    pub fn with_target_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.target_dir = Some(dir.into());
        self
    }

    /// Sets the premature write policy.
    #[must_use]
    pub fn with_premature_writes(mut self, policy: PrematureWritePolicy) -> Self {
        self.premature_writes = policy;
        self
    }

    /// Returns the target directory, if configured.
    #[must_use]
    pub fn target_dir(&self) -> Option<&Path> {
        self.target_dir.as_deref()
    }
}
