//! Per-file metadata as recorded in the archive database.

/// Metadata for one file inside a solid folder.
///
/// Descriptors are produced by whatever parses the archive header and are
/// treated as read-only for the duration of an extraction pass.
///
/// # Examples
///
/// ```
/// use foldermux_core::FileDescriptor;
///
/// let file = FileDescriptor::file(5, Some(0x3610_a686));
/// assert!(file.is_regular());
/// assert!(file.expects_data());
///
/// let dir = FileDescriptor::directory();
/// assert!(!dir.expects_data());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileDescriptor {
    /// Declared unpacked size in bytes.
    pub size: u64,

    /// Entry is a directory.
    pub is_directory: bool,

    /// Entry is an anti-item (marks a deletion in an update archive).
    pub is_anti: bool,

    /// CRC-32 of the unpacked content, when the archive records one.
    pub crc: Option<u32>,
}

impl FileDescriptor {
    /// Creates a regular file descriptor.
    #[must_use]
    pub const fn file(size: u64, crc: Option<u32>) -> Self {
        Self {
            size,
            is_directory: false,
            is_anti: false,
            crc,
        }
    }

    /// Creates a directory descriptor.
    #[must_use]
    pub const fn directory() -> Self {
        Self {
            size: 0,
            is_directory: true,
            is_anti: false,
            crc: None,
        }
    }

    /// Creates an anti-item descriptor.
    #[must_use]
    pub const fn anti() -> Self {
        Self {
            size: 0,
            is_directory: false,
            is_anti: true,
            crc: None,
        }
    }

    /// Returns `true` for entries that are neither directories nor anti-items.
    #[must_use]
    pub const fn is_regular(&self) -> bool {
        !self.is_directory && !self.is_anti
    }

    /// Returns `true` if this entry consumes bytes from the folder stream.
    ///
    /// Only regular files with a non-zero size do. Directories and
    /// anti-items never consume stream bytes, whatever size they declare.
    #[must_use]
    pub const fn expects_data(&self) -> bool {
        self.is_regular() && self.size != 0
    }

    /// Checks accumulated content against the recorded CRC.
    ///
    /// A descriptor without a recorded CRC matches anything.
    #[must_use]
    pub fn crc_matches(&self, actual: u32) -> bool {
        self.crc.is_none_or(|expected| expected == actual)
    }
}
