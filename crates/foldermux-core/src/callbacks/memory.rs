//! In-memory extraction callback.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::callback::CallbackError;
use crate::callback::CallbackResult;
use crate::callback::ExtractCallback;
use crate::callback::SinkRequest;
use crate::io::SharedSink;
use crate::report::FileRecord;
use crate::report::FolderReport;
use crate::types::ExtractMode;
use crate::types::OperationResult;

/// A callback call, as recorded by [`MemoryCallback`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackEvent {
    /// `request_sink` for a global index.
    Request {
        /// Global index.
        index: u32,
        /// Requested mode.
        mode: ExtractMode,
    },
    /// `begin_operation` with the effective mode.
    Begin(ExtractMode),
    /// `report_result`.
    Result(OperationResult),
}

#[derive(Debug)]
struct Pending {
    index: u32,
    mode: ExtractMode,
    sink: Option<SharedSink<Vec<u8>>>,
}

/// Collects extracted files into memory buffers.
///
/// Supplies a buffer for every `Extract` request and none for `Test` or
/// `Skip`. Every call is recorded, which makes this type a convenient test
/// double; [`decline`](Self::decline) and [`cancel_at`](Self::cancel_at)
/// simulate callbacks that refuse a file or stop the operation.
#[derive(Debug, Default)]
pub struct MemoryCallback {
    declined: BTreeSet<u32>,
    cancel_at: Option<u32>,
    events: Vec<CallbackEvent>,
    outputs: BTreeMap<u32, Vec<u8>>,
    current: Option<Pending>,
    report: FolderReport,
}

impl MemoryCallback {
    /// Creates a callback that accepts every file.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declines to supply a sink for the given global index.
    #[must_use]
    pub fn decline(mut self, index: u32) -> Self {
        self.declined.insert(index);
        self
    }

    /// Cancels the operation when the given global index is requested.
    #[must_use]
    pub fn cancel_at(mut self, index: u32) -> Self {
        self.cancel_at = Some(index);
        self
    }

    /// Content stored for a global index, once its result is reported.
    #[must_use]
    pub fn output(&self, index: u32) -> Option<&[u8]> {
        self.outputs.get(&index).map(Vec::as_slice)
    }

    /// All stored outputs keyed by global index.
    #[must_use]
    pub fn outputs(&self) -> &BTreeMap<u32, Vec<u8>> {
        &self.outputs
    }

    /// Every callback call in order.
    #[must_use]
    pub fn events(&self) -> &[CallbackEvent] {
        &self.events
    }

    /// `(index, result)` pairs in report order.
    #[must_use]
    pub fn results(&self) -> Vec<(u32, OperationResult)> {
        self.report
            .records()
            .iter()
            .map(|r| (r.index, r.result))
            .collect()
    }

    /// Per-file ledger.
    #[must_use]
    pub fn report(&self) -> &FolderReport {
        &self.report
    }
}

impl ExtractCallback for MemoryCallback {
    type Sink = SharedSink<Vec<u8>>;

    fn request_sink(&mut self, request: &SinkRequest<'_>) -> CallbackResult<Option<Self::Sink>> {
        self.events.push(CallbackEvent::Request {
            index: request.index,
            mode: request.mode,
        });
        if self.cancel_at == Some(request.index) {
            return Err(CallbackError::Cancelled);
        }
        if let Some(pending) = &self.current {
            return Err(CallbackError::Protocol(format!(
                "file #{} requested before #{} was reported",
                request.index, pending.index
            )));
        }

        let sink = (request.mode == ExtractMode::Extract && !self.declined.contains(&request.index))
            .then(|| SharedSink::new(Vec::new()));
        self.current = Some(Pending {
            index: request.index,
            mode: request.mode,
            sink: sink.clone(),
        });
        Ok(sink)
    }

    fn begin_operation(&mut self, mode: ExtractMode) -> CallbackResult<()> {
        self.events.push(CallbackEvent::Begin(mode));
        let pending = self
            .current
            .as_mut()
            .ok_or_else(|| CallbackError::Protocol("operation begun without a request".into()))?;
        pending.mode = mode;
        Ok(())
    }

    fn report_result(&mut self, result: OperationResult) -> CallbackResult<()> {
        self.events.push(CallbackEvent::Result(result));
        let pending = self
            .current
            .take()
            .ok_or_else(|| CallbackError::Protocol("result reported without a request".into()))?;

        let mut bytes = 0;
        if let Some(sink) = pending.sink {
            let data = sink
                .try_into_inner()
                .unwrap_or_else(|shared| shared.with(|data| data.clone()));
            bytes = data.len() as u64;
            self.outputs.insert(pending.index, data);
        }

        self.report.record(FileRecord {
            index: pending.index,
            mode: pending.mode,
            result,
            bytes,
        });
        Ok(())
    }
}
