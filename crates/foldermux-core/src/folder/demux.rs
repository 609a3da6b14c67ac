//! The folder demultiplexer state machine.

use std::io;
use std::io::Write;

use tracing::debug;
use tracing::trace;
use tracing::warn;

use super::state::DemuxState;
use super::state::Phase;
use super::table::FolderTable;
use crate::DemuxConfig;
use crate::DemuxError;
use crate::PrematureWritePolicy;
use crate::Result;
use crate::callback::CallbackError;
use crate::callback::CallbackStage;
use crate::callback::ExtractCallback;
use crate::callback::SinkRequest;
use crate::io::CrcWriter;
use crate::types::ExtractMode;
use crate::types::OperationResult;

/// Routes a solid folder's decompressed stream to per-file sinks.
///
/// Feed the stream in order through [`write_bytes`](Self::write_bytes) (or
/// the [`Write`] impl). Each file is opened through the callback, receives
/// exactly its declared number of bytes, has its CRC checked, and gets its
/// result reported before the next file opens. Zero-length files,
/// directories and anti-items never consume bytes; they are closed with
/// [`OperationResult::Ok`] as soon as they become current.
///
/// # Examples
///
/// ```
/// use foldermux_core::DemuxConfig;
/// use foldermux_core::FileDescriptor;
/// use foldermux_core::FolderDemux;
/// use foldermux_core::FolderTable;
/// use foldermux_core::callbacks::MemoryCallback;
///
/// # fn main() -> foldermux_core::Result<()> {
/// let files = [
///     FileDescriptor::file(0, None),
///     FileDescriptor::file(5, Some(crc32fast::hash(b"HELLO"))),
///     FileDescriptor::file(3, None),
/// ];
/// let table = FolderTable::new(&files, 0, &[true, true, true], false)?;
/// let mut demux = FolderDemux::new(table, MemoryCallback::new(), DemuxConfig::default())?;
///
/// demux.write_bytes(b"HELLOxyz")?;
/// assert!(demux.is_complete());
///
/// let callback = demux.into_callback();
/// assert_eq!(callback.output(1), Some(&b"HELLO"[..]));
/// assert_eq!(callback.output(2), Some(&b"xyz"[..]));
/// assert!(callback.report().all_ok());
/// # Ok(())
/// # }
/// ```
pub struct FolderDemux<'a, C: ExtractCallback> {
    table: FolderTable<'a>,
    callback: C,
    config: DemuxConfig,
    sink: CrcWriter<C::Sink>,
    state: DemuxState,
    bytes_consumed: u64,
    bytes_forwarded: u64,
}

impl<'a, C: ExtractCallback> FolderDemux<'a, C> {
    /// Creates a demultiplexer positioned at the folder's first file.
    ///
    /// Leading zero-length files, directories and anti-items are reported
    /// right away, so the callback may already have seen several results
    /// when this returns.
    ///
    /// # Errors
    ///
    /// Returns [`DemuxError::CallbackRejected`] if the callback fails while
    /// those leading entries are processed.
    pub fn new(table: FolderTable<'a>, callback: C, config: DemuxConfig) -> Result<Self> {
        debug!(
            files = table.len(),
            start_index = table.start_index(),
            declared_bytes = table.declared_bytes(),
            "starting folder"
        );

        let mut demux = Self {
            table,
            callback,
            config,
            sink: CrcWriter::new(),
            state: DemuxState::new(),
            bytes_consumed: 0,
            bytes_forwarded: 0,
        };
        demux.skip_empty_run()?;
        Ok(demux)
    }

    /// Routes `data` to the files it belongs to.
    ///
    /// Returns the number of bytes consumed. This is all of `data` unless
    /// the folder completes partway through it; the leftover is refused on
    /// the next call according to the [`PrematureWritePolicy`].
    ///
    /// # Errors
    ///
    /// - [`DemuxError::PrematureWrite`] if the folder is already complete
    ///   and the policy is [`PrematureWritePolicy::Reject`]; state is not
    ///   touched.
    /// - [`DemuxError::CallbackRejected`] if any callback call fails; the
    ///   pass is aborted where it stands.
    /// - [`DemuxError::Sink`] if a destination write fails.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<usize> {
        if data.is_empty() {
            return Ok(0);
        }
        if self.is_complete() {
            return self.refuse(data.len());
        }

        let mut consumed = 0;
        while !self.is_complete() {
            if self.state.is_file_open() {
                consumed += self.emit(&data[consumed..])?;
                if self.state.file_pos() == self.table.descriptor(self.state.current()).size {
                    self.close_current()?;
                    self.skip_empty_run()?;
                }
                if consumed == data.len() {
                    return Ok(consumed);
                }
            } else {
                self.open_next()?;
            }
        }

        if self.config.premature_writes == PrematureWritePolicy::Ignore {
            warn!(len = data.len() - consumed, "discarding bytes past the end of the folder");
            return Ok(data.len());
        }
        Ok(consumed)
    }

    /// Returns `true` once every file of the folder has its result.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state.is_done(self.table.len())
    }

    /// Global index of the file currently being processed, or `None` when
    /// the folder is complete.
    #[must_use]
    pub fn current_index(&self) -> Option<u32> {
        (!self.is_complete()).then(|| self.table.global_index(self.state.current()))
    }

    /// Number of files still waiting for a result.
    #[must_use]
    pub fn remaining_files(&self) -> u32 {
        self.table.len() - self.state.current()
    }

    /// Current phase of the state machine.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.state.phase(self.table.len())
    }

    /// Iteration counters.
    #[must_use]
    pub fn state(&self) -> &DemuxState {
        &self.state
    }

    /// The folder table being processed.
    #[must_use]
    pub fn table(&self) -> &FolderTable<'a> {
        &self.table
    }

    /// Configuration the demultiplexer was built with.
    #[must_use]
    pub fn config(&self) -> &DemuxConfig {
        &self.config
    }

    /// Bytes of the folder stream routed so far, whatever their mode.
    #[must_use]
    pub fn bytes_consumed(&self) -> u64 {
        self.bytes_consumed
    }

    /// Bytes handed to callback-supplied sinks so far.
    #[must_use]
    pub fn bytes_forwarded(&self) -> u64 {
        self.bytes_forwarded
    }

    /// Returns a reference to the callback.
    #[must_use]
    pub fn callback(&self) -> &C {
        &self.callback
    }

    /// Returns a mutable reference to the callback.
    pub fn callback_mut(&mut self) -> &mut C {
        &mut self.callback
    }

    /// Consumes the demultiplexer and returns the callback.
    ///
    /// Any sink still installed is dropped first.
    pub fn into_callback(mut self) -> C {
        drop(self.sink.release());
        self.callback
    }

    pub(super) fn open_next(&mut self) -> Result<()> {
        let local = self.state.current();
        let index = self.table.global_index(local);
        let descriptor = self.table.descriptor(local);
        let mut mode = self.table.mode(local);

        let request = SinkRequest {
            index,
            mode,
            target_dir: self.config.target_dir(),
        };
        let sink = self
            .callback
            .request_sink(&request)
            .map_err(rejected(index, CallbackStage::RequestSink))?;

        let supplied = sink.is_some();
        self.sink.set_destination(sink);
        if mode == ExtractMode::Extract && !supplied && descriptor.is_regular() {
            debug!(index, "no sink supplied, downgrading to skip");
            mode = ExtractMode::Skip;
        }

        self.callback
            .begin_operation(mode)
            .map_err(rejected(index, CallbackStage::BeginOperation))?;
        self.state.open();

        debug!(index, %mode, size = descriptor.size, "opened file");
        Ok(())
    }

    /// Releases the sink, reports `result` for the open file and advances.
    pub(super) fn finish_file(&mut self, result: OperationResult) -> Result<()> {
        let index = self.table.global_index(self.state.current());

        drop(self.sink.release());
        self.callback
            .report_result(result)
            .map_err(rejected(index, CallbackStage::ReportResult))?;
        self.state.advance();

        debug!(index, %result, "closed file");
        Ok(())
    }

    fn emit(&mut self, data: &[u8]) -> Result<usize> {
        let local = self.state.current();
        let remaining = self.table.descriptor(local).size - self.state.file_pos();
        let n = usize::try_from(remaining).map_or(data.len(), |r| r.min(data.len()));

        if n > 0 {
            self.sink
                .write_all(&data[..n])
                .map_err(|source| DemuxError::Sink {
                    index: self.table.global_index(local),
                    source,
                })?;
        }

        let n64 = n as u64;
        self.state.emitted(n64);
        self.bytes_consumed += n64;
        if self.sink.has_destination() {
            self.bytes_forwarded += n64;
        }

        trace!(index = self.table.global_index(local), bytes = n, pos = self.state.file_pos(), "emitted");
        Ok(n)
    }

    fn close_current(&mut self) -> Result<()> {
        let local = self.state.current();
        let descriptor = self.table.descriptor(local);
        let actual = self.sink.crc();

        let result = if descriptor.crc_matches(actual) {
            OperationResult::Ok
        } else {
            warn!(
                index = self.table.global_index(local),
                expected = ?descriptor.crc,
                actual,
                "CRC mismatch"
            );
            OperationResult::ChecksumMismatch
        };
        self.finish_file(result)
    }

    /// Closes every entry that consumes no bytes, up to the next one that does.
    fn skip_empty_run(&mut self) -> Result<()> {
        while !self.is_complete() {
            if self.table.descriptor(self.state.current()).expects_data() {
                break;
            }
            self.open_next()?;
            self.finish_file(OperationResult::Ok)?;
        }
        Ok(())
    }

    fn refuse(&self, len: usize) -> Result<usize> {
        match self.config.premature_writes {
            PrematureWritePolicy::Reject => Err(DemuxError::PrematureWrite { len }),
            PrematureWritePolicy::Ignore => {
                warn!(len, "discarding bytes past the end of the folder");
                Ok(len)
            }
        }
    }
}

impl<C: ExtractCallback> Write for FolderDemux<'_, C> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_bytes(buf).map_err(|err| {
            let kind = match &err {
                DemuxError::Sink { source, .. } | DemuxError::Io(source) => source.kind(),
                _ => io::ErrorKind::Other,
            };
            io::Error::new(kind, err)
        })
    }

    fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }
}

fn rejected(index: u32, stage: CallbackStage) -> impl FnOnce(CallbackError) -> DemuxError {
    move |source| DemuxError::CallbackRejected {
        index,
        stage,
        source,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::callbacks::CallbackEvent;
    use crate::callbacks::MemoryCallback;
    use crate::types::FileDescriptor;

    fn demux<'a>(
        files: &'a [FileDescriptor],
        wanted: &[bool],
        callback: &'a mut MemoryCallback,
    ) -> FolderDemux<'a, &'a mut MemoryCallback> {
        let table = FolderTable::new(files, 0, wanted, false).unwrap();
        FolderDemux::new(table, callback, DemuxConfig::default()).unwrap()
    }

    /// Records whether the callback held the only handle at report time.
    #[derive(Default)]
    struct SoleOwner {
        current: Option<crate::io::SharedSink<Vec<u8>>>,
        sole_at_report: Vec<bool>,
    }

    impl ExtractCallback for SoleOwner {
        type Sink = crate::io::SharedSink<Vec<u8>>;

        fn request_sink(
            &mut self,
            _request: &SinkRequest<'_>,
        ) -> crate::CallbackResult<Option<Self::Sink>> {
            let sink = crate::io::SharedSink::new(Vec::new());
            self.current = Some(sink.clone());
            Ok(Some(sink))
        }

        fn begin_operation(&mut self, _mode: ExtractMode) -> crate::CallbackResult<()> {
            Ok(())
        }

        fn report_result(&mut self, _result: OperationResult) -> crate::CallbackResult<()> {
            let sink = self.current.take().unwrap();
            self.sole_at_report.push(sink.try_into_inner().is_ok());
            Ok(())
        }
    }

    #[test]
    fn test_sink_released_before_report() {
        let files = [FileDescriptor::file(2, None), FileDescriptor::file(3, None)];
        let table = FolderTable::new(&files, 0, &[true, true], false).unwrap();
        let mut demux =
            FolderDemux::new(table, SoleOwner::default(), DemuxConfig::default()).unwrap();

        demux.write_bytes(b"abc").unwrap();
        demux.flush_corrupted(OperationResult::DataError).unwrap();

        // normal close and flush both drop the handle first
        assert_eq!(demux.into_callback().sole_at_report, vec![true, true]);
    }

    #[test]
    fn test_leading_empty_files_closed_on_creation() {
        let files = [
            FileDescriptor::file(0, None),
            FileDescriptor::directory(),
            FileDescriptor::file(2, None),
        ];
        let mut callback = MemoryCallback::new();
        let demux = demux(&files, &[true; 3], &mut callback);
        assert_eq!(demux.current_index(), Some(2));
        assert_eq!(demux.phase(), Phase::Idle { local: 2 });
        drop(demux);

        assert_eq!(callback.report().len(), 2);
        assert!(callback.report().all_ok());
    }

    #[test]
    fn test_write_split_across_calls() {
        let files = [FileDescriptor::file(6, Some(crc32fast::hash(b"abcdef")))];
        let mut callback = MemoryCallback::new();
        let mut demux = demux(&files, &[true], &mut callback);

        assert_eq!(demux.write_bytes(b"abc").unwrap(), 3);
        assert_eq!(demux.phase(), Phase::Open { local: 0, pos: 3 });
        assert_eq!(demux.write_bytes(b"def").unwrap(), 3);
        assert!(demux.is_complete());
        drop(demux);

        assert_eq!(callback.output(0), Some(&b"abcdef"[..]));
        assert!(callback.report().all_ok());
    }

    #[test]
    fn test_crc_mismatch_reported_and_next_file_processed() {
        let files = [
            FileDescriptor::file(2, Some(0)),
            FileDescriptor::file(2, Some(crc32fast::hash(b"cd"))),
        ];
        let mut callback = MemoryCallback::new();
        let mut demux = demux(&files, &[true; 2], &mut callback);
        demux.write_bytes(b"abcd").unwrap();
        assert!(demux.is_complete());
        drop(demux);

        assert_eq!(
            callback.results(),
            vec![
                (0, OperationResult::ChecksumMismatch),
                (1, OperationResult::Ok)
            ]
        );
        assert_eq!(callback.output(1), Some(&b"cd"[..]));
    }

    #[test]
    fn test_premature_write_rejected_without_state_change() {
        let files = [FileDescriptor::file(1, None)];
        let mut callback = MemoryCallback::new();
        let mut demux = demux(&files, &[true], &mut callback);

        assert_eq!(demux.write_bytes(b"ab").unwrap(), 1);
        let err = demux.write_bytes(b"b").unwrap_err();
        assert!(matches!(err, DemuxError::PrematureWrite { len: 1 }));
        assert!(demux.is_complete());
        assert_eq!(demux.bytes_consumed(), 1);
    }

    #[test]
    fn test_premature_write_ignored_by_policy() {
        let files = [FileDescriptor::file(1, None)];
        let mut callback = MemoryCallback::new();
        let table = FolderTable::new(&files, 0, &[true], false).unwrap();
        let config = DemuxConfig::default().with_premature_writes(PrematureWritePolicy::Ignore);
        let mut demux = FolderDemux::new(table, &mut callback, config).unwrap();

        assert_eq!(demux.write_bytes(b"abc").unwrap(), 3);
        assert_eq!(demux.write_bytes(b"def").unwrap(), 3);
        assert_eq!(demux.bytes_consumed(), 1);
    }

    #[test]
    fn test_empty_write_is_noop() {
        let files = [FileDescriptor::file(1, None)];
        let mut callback = MemoryCallback::new();
        let mut demux = demux(&files, &[true], &mut callback);
        assert_eq!(demux.write_bytes(&[]).unwrap(), 0);
        assert_eq!(demux.phase(), Phase::Idle { local: 0 });
    }

    #[test]
    fn test_declined_sink_downgrades_to_skip() {
        let files = [FileDescriptor::file(3, None)];
        let mut callback = MemoryCallback::new().decline(0);
        let mut demux = demux(&files, &[true], &mut callback);
        demux.write_bytes(b"xyz").unwrap();
        assert_eq!(demux.bytes_forwarded(), 0);
        assert_eq!(demux.bytes_consumed(), 3);
        drop(demux);

        assert!(callback.events().contains(&CallbackEvent::Begin(ExtractMode::Skip)));
    }

    #[test]
    fn test_write_trait_reports_premature_write() {
        let files = [FileDescriptor::file(2, None)];
        let mut callback = MemoryCallback::new();
        let mut demux = demux(&files, &[true], &mut callback);

        let err = demux.write_all(b"abc").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Other);
        let inner = err.get_ref().unwrap().downcast_ref::<DemuxError>().unwrap();
        assert!(matches!(inner, DemuxError::PrematureWrite { len: 1 }));
    }

    #[test]
    fn test_cancel_aborts_in_place() {
        let files = [
            FileDescriptor::file(1, None),
            FileDescriptor::file(1, None),
            FileDescriptor::file(1, None),
        ];
        let mut callback = MemoryCallback::new().cancel_at(1);
        let mut demux = demux(&files, &[true; 3], &mut callback);

        let err = demux.write_bytes(b"abc").unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(err.index(), Some(1));
        assert_eq!(demux.current_index(), Some(1));
        drop(demux);

        assert_eq!(callback.results(), vec![(0, OperationResult::Ok)]);
    }
}
