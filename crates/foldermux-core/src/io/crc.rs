//! Checksum-accumulating writer.
//!
//! `CrcWriter` forwards every write to an optional destination and keeps a
//! running CRC-32 over the bytes it accepted since the last reset.

use std::io::Write;

use crc32fast::Hasher;

/// Writer that forwards to an optional destination and tracks CRC-32.
///
/// With no destination installed, writes still succeed and still feed the
/// checksum; this is how test mode verifies content without storing it.
///
/// The destination is never flushed or closed by this type. [`release`]
/// hands the handle back so the owner decides what happens to it.
///
/// [`release`]: CrcWriter::release
///
/// # Examples
///
/// ```
/// use foldermux_core::io::CrcWriter;
/// use std::io::Write;
///
/// let mut buffer = Vec::new();
/// let mut writer = CrcWriter::new();
/// writer.set_destination(Some(&mut buffer));
///
/// writer.write_all(b"HELLO")?;
/// assert_eq!(writer.total_bytes(), 5);
/// assert_eq!(writer.crc(), crc32fast::hash(b"HELLO"));
///
/// writer.release();
/// assert_eq!(buffer, b"HELLO");
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct CrcWriter<W> {
    /// Destination for forwarded bytes, if any
    inner: Option<W>,
    /// Running checksum since the last reset
    hasher: Hasher,
    /// Bytes accepted since the last reset
    bytes_written: u64,
}

impl<W> CrcWriter<W> {
    /// Creates a writer with no destination and an empty checksum.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: None,
            hasher: Hasher::new(),
            bytes_written: 0,
        }
    }

    /// Installs a destination (or none) and resets the checksum.
    ///
    /// A previously installed destination is dropped without being flushed.
    pub fn set_destination(&mut self, inner: Option<W>) {
        self.inner = inner;
        self.reset();
    }

    /// Resets the checksum and byte count, keeping the destination.
    pub fn reset(&mut self) {
        self.hasher = Hasher::new();
        self.bytes_written = 0;
    }

    /// Returns the CRC-32 of all bytes accepted since the last reset.
    #[must_use]
    pub fn crc(&self) -> u32 {
        self.hasher.clone().finalize()
    }

    /// Returns the number of bytes accepted since the last reset.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.bytes_written
    }

    /// Returns `true` if a destination is installed.
    #[must_use]
    pub fn has_destination(&self) -> bool {
        self.inner.is_some()
    }

    /// Returns a reference to the destination, if any.
    #[must_use]
    pub fn get_ref(&self) -> Option<&W> {
        self.inner.as_ref()
    }

    /// Detaches the destination and returns it, without flushing.
    ///
    /// The checksum is left untouched so it can still be read after release.
    pub fn release(&mut self) -> Option<W> {
        self.inner.take()
    }
}

impl<W> Default for CrcWriter<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Write for CrcWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let accepted = match self.inner.as_mut() {
            Some(inner) => inner.write(buf)?,
            None => buf.len(),
        };
        self.hasher.update(&buf[..accepted]);
        self.bytes_written += accepted as u64;
        Ok(accepted)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self.inner.as_mut() {
            Some(inner) => inner.flush(),
            None => Ok(()),
        }
    }
}
