//! The extraction callback contract.
//!
//! The demultiplexer never decides where bytes go. For every file it asks an
//! [`ExtractCallback`] for a sink, announces the operation, and finally
//! reports the file's result. Implementations may target the filesystem,
//! memory, or a test double.

use std::fmt;
use std::io::Write;
use std::path::Path;

use thiserror::Error;

use crate::types::ExtractMode;
use crate::types::OperationResult;

/// Result type returned by callback operations.
pub type CallbackResult<T> = std::result::Result<T, CallbackError>;

/// Non-success signals a callback can return.
///
/// Any of them aborts the folder immediately.
#[derive(Error, Debug)]
pub enum CallbackError {
    /// The user or orchestrator asked to stop.
    #[error("operation cancelled")]
    Cancelled,

    /// The callback failed to prepare or finish a destination.
    #[error("callback I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The callback refused the request with an implementation-defined code.
    #[error("request rejected with code {code}")]
    Rejected {
        /// Implementation-defined status code.
        code: i32,
    },

    /// The callback was driven out of order.
    #[error("callback protocol violation: {0}")]
    Protocol(String),
}

/// Callback operation in progress when an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackStage {
    /// [`ExtractCallback::request_sink`].
    RequestSink,
    /// [`ExtractCallback::begin_operation`].
    BeginOperation,
    /// [`ExtractCallback::report_result`].
    ReportResult,
}

impl fmt::Display for CallbackStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::RequestSink => "request_sink",
            Self::BeginOperation => "begin_operation",
            Self::ReportResult => "report_result",
        })
    }
}

/// A request for the destination of one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkRequest<'a> {
    /// Global index of the file (`ref2_offset + start_index + local`).
    pub index: u32,
    /// Decision for the file, before any downgrade.
    pub mode: ExtractMode,
    /// Directory the extraction targets, if the caller configured one.
    pub target_dir: Option<&'a Path>,
}

/// Capability set the demultiplexer consumes, one file at a time.
///
/// For each file the calls arrive in a fixed order: `request_sink`, then
/// `begin_operation`, then bytes flow into the returned sink, then
/// `report_result` exactly once. The sink handle is dropped right before
/// `report_result`; the callback keeps ownership of the real resource (see
/// [`Sink`](Self::Sink)) and is responsible for flushing, closing or deleting
/// it.
///
/// # Examples
///
/// ```
/// use foldermux_core::CallbackResult;
/// use foldermux_core::ExtractCallback;
/// use foldermux_core::ExtractMode;
/// use foldermux_core::OperationResult;
/// use foldermux_core::SinkRequest;
///
/// /// Verifies everything, writes nothing.
/// struct Verifier {
///     failures: usize,
/// }
///
/// impl ExtractCallback for Verifier {
///     type Sink = std::io::Sink;
///
///     fn request_sink(&mut self, _request: &SinkRequest<'_>) -> CallbackResult<Option<Self::Sink>> {
///         Ok(None)
///     }
///
///     fn begin_operation(&mut self, _mode: ExtractMode) -> CallbackResult<()> {
///         Ok(())
///     }
///
///     fn report_result(&mut self, result: OperationResult) -> CallbackResult<()> {
///         if !result.is_ok() {
///             self.failures += 1;
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait ExtractCallback {
    /// Destination handle handed to the demultiplexer.
    ///
    /// The handle is dropped before `report_result`, so it must not own the
    /// real resource: hand out a non-owning handle such as
    /// [`SharedSink`](crate::io::SharedSink) and keep the resource in the
    /// callback. An owned `File` or `BufWriter<File>` would be flushed and
    /// closed by that drop, before the result is known.
    type Sink: Write;

    /// Supplies the destination for a file, or `None` to decline.
    ///
    /// Declining an `Extract` request for a regular file downgrades it to
    /// `Skip`.
    fn request_sink(&mut self, request: &SinkRequest<'_>) -> CallbackResult<Option<Self::Sink>>;

    /// Announces the effective mode before any byte of the file flows.
    fn begin_operation(&mut self, mode: ExtractMode) -> CallbackResult<()>;

    /// Reports the outcome of the current file.
    fn report_result(&mut self, result: OperationResult) -> CallbackResult<()>;
}

impl<C: ExtractCallback + ?Sized> ExtractCallback for &mut C {
    type Sink = C::Sink;

    fn request_sink(&mut self, request: &SinkRequest<'_>) -> CallbackResult<Option<Self::Sink>> {
        (**self).request_sink(request)
    }

    fn begin_operation(&mut self, mode: ExtractMode) -> CallbackResult<()> {
        (**self).begin_operation(mode)
    }

    fn report_result(&mut self, result: OperationResult) -> CallbackResult<()> {
        (**self).report_result(result)
    }
}
