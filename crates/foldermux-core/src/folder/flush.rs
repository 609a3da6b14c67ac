//! Degraded-mode completion of a folder.

use tracing::warn;

use super::FolderDemux;
use crate::Result;
use crate::callback::ExtractCallback;
use crate::types::OperationResult;

impl<C: ExtractCallback> FolderDemux<'_, C> {
    /// Reports `result` for every file that has not received one yet.
    ///
    /// Used once the decoder has failed for good: no more bytes will come,
    /// but the callback still expects exactly one result per file. An open
    /// file is closed with `result` as is; each remaining file is opened
    /// through the callback and immediately closed with `result`. No
    /// checksum is computed. Calling this on a complete folder does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`DemuxError::CallbackRejected`](crate::DemuxError::CallbackRejected)
    /// if the callback fails; the flush stops at that file.
    ///
    /// # Examples
    ///
    /// ```
    /// use foldermux_core::DemuxConfig;
    /// use foldermux_core::FileDescriptor;
    /// use foldermux_core::FolderDemux;
    /// use foldermux_core::FolderTable;
    /// use foldermux_core::OperationResult;
    /// use foldermux_core::callbacks::MemoryCallback;
    ///
    /// # fn main() -> foldermux_core::Result<()> {
    /// let files = [FileDescriptor::file(4, None), FileDescriptor::file(4, None)];
    /// let table = FolderTable::new(&files, 0, &[true, true], false)?;
    /// let mut demux = FolderDemux::new(table, MemoryCallback::new(), DemuxConfig::default())?;
    ///
    /// demux.write_bytes(b"ab")?;
    /// demux.flush_corrupted(OperationResult::DataError)?;
    /// assert!(demux.is_complete());
    /// assert_eq!(demux.callback().report().forced_failures(), 2);
    /// # Ok(())
    /// # }
    /// ```
    pub fn flush_corrupted(&mut self, result: OperationResult) -> Result<()> {
        if !self.is_complete() {
            warn!(
                remaining = self.remaining_files(),
                %result,
                "flushing corrupted folder"
            );
        }

        while !self.is_complete() {
            if self.state().is_file_open() {
                self.finish_file(result)?;
            } else {
                self.open_next()?;
            }
        }
        Ok(())
    }
}
