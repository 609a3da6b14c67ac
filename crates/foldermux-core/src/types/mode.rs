//! Per-file extraction decision.

use std::fmt;

/// What the caller wants done with one file of the folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractMode {
    /// Write the content to a sink supplied by the callback.
    Extract,
    /// Decode and verify the content without writing it anywhere.
    Test,
    /// Advance past the content; the callback is not interested in it.
    Skip,
}

impl ExtractMode {
    /// Derives the mode from the caller's selection and the global test flag.
    ///
    /// # Examples
    ///
    /// ```
    /// use foldermux_core::ExtractMode;
    ///
    /// assert_eq!(ExtractMode::select(true, false), ExtractMode::Extract);
    /// assert_eq!(ExtractMode::select(true, true), ExtractMode::Test);
    /// assert_eq!(ExtractMode::select(false, true), ExtractMode::Skip);
    /// ```
    #[must_use]
    pub const fn select(wanted: bool, test_mode: bool) -> Self {
        match (wanted, test_mode) {
            (false, _) => Self::Skip,
            (true, true) => Self::Test,
            (true, false) => Self::Extract,
        }
    }

    /// Returns the lowercase name of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Extract => "extract",
            Self::Test => "test",
            Self::Skip => "skip",
        }
    }
}

impl fmt::Display for ExtractMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
