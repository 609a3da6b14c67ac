//! Filesystem extraction callback.

use std::fs;
use std::fs::File;
use std::io;
use std::io::BufWriter;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;
use tracing::warn;

use crate::DemuxError;
use crate::Result;
use crate::callback::CallbackError;
use crate::callback::CallbackResult;
use crate::callback::ExtractCallback;
use crate::callback::SinkRequest;
use crate::io::SharedSink;
use crate::report::FileRecord;
use crate::report::FolderReport;
use crate::types::ExtractMode;
use crate::types::FileDescriptor;
use crate::types::OperationResult;

/// Where one archive entry lands on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputEntry {
    /// Relative path of the entry.
    pub name: String,
    /// Entry is a directory.
    pub is_directory: bool,
    /// Entry is an anti-item.
    pub is_anti: bool,
}

impl OutputEntry {
    /// Pairs an entry name with its descriptor flags.
    #[must_use]
    pub fn new(name: impl Into<String>, descriptor: &FileDescriptor) -> Self {
        Self {
            name: name.into(),
            is_directory: descriptor.is_directory,
            is_anti: descriptor.is_anti,
        }
    }
}

#[derive(Debug)]
struct Pending {
    index: u32,
    mode: ExtractMode,
    file: Option<OpenFile>,
}

/// A regular file created for the pending entry.
#[derive(Debug)]
struct OpenFile {
    path: PathBuf,
    sink: SharedSink<BufWriter<File>>,
}

/// Writes extracted files under a directory.
///
/// The directory passed with each sink request wins over the one given at
/// construction. Entry names must be relative paths made of plain
/// components; anything else is refused with an I/O error, which aborts the
/// folder.
///
/// For `Extract` requests:
/// - regular files are created (parents included) and handed out as a
///   buffered sink;
/// - directories are created and get no sink;
/// - anti-items remove an existing file or empty directory and get no sink.
///
/// When a file's result arrives it is flushed and closed. A file whose
/// result is not `Ok` is deleted unless [`keep_corrupted`](Self::keep_corrupted)
/// is set.
#[derive(Debug)]
pub struct DirectoryCallback {
    root: PathBuf,
    entries: Vec<OutputEntry>,
    index_offset: u32,
    keep_corrupted: bool,
    current: Option<Pending>,
    report: FolderReport,
}

impl DirectoryCallback {
    /// Creates a callback writing under `root`.
    ///
    /// `entries[i]` describes global index `i` (see
    /// [`with_index_offset`](Self::with_index_offset)).
    ///
    /// # Errors
    ///
    /// Returns an error if `root` does not exist or is not a directory.
    pub fn new(root: impl Into<PathBuf>, entries: Vec<OutputEntry>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(DemuxError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("output directory does not exist: {}", root.display()),
            )));
        }

        Ok(Self {
            root,
            entries,
            index_offset: 0,
            keep_corrupted: false,
            current: None,
            report: FolderReport::new(),
        })
    }

    /// Subtracts `offset` from global indices before looking up entries.
    #[must_use]
    pub fn with_index_offset(mut self, offset: u32) -> Self {
        self.index_offset = offset;
        self
    }

    /// Keeps files whose result is not `Ok` instead of deleting them.
    #[must_use]
    pub fn keep_corrupted(mut self, keep: bool) -> Self {
        self.keep_corrupted = keep;
        self
    }

    /// Per-file ledger.
    #[must_use]
    pub fn report(&self) -> &FolderReport {
        &self.report
    }

    /// Consumes the callback and returns its ledger.
    #[must_use]
    pub fn into_report(self) -> FolderReport {
        self.report
    }

    fn entry(&self, index: u32) -> CallbackResult<&OutputEntry> {
        index
            .checked_sub(self.index_offset)
            .and_then(|i| self.entries.get(i as usize))
            .ok_or_else(|| CallbackError::Protocol(format!("no entry for file #{index}")))
    }

    fn create_file(path: &Path) -> io::Result<SharedSink<BufWriter<File>>> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        Ok(SharedSink::new(BufWriter::new(file)))
    }

    fn remove_anti(path: &Path) -> io::Result<()> {
        match fs::symlink_metadata(path) {
            Ok(meta) if meta.is_dir() => fs::remove_dir(path),
            Ok(_) => fs::remove_file(path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Validates an entry name and turns it into a relative path.
fn relative_path(name: &str) -> CallbackResult<PathBuf> {
    let path = Path::new(name);
    let plain = !name.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if !plain {
        return Err(CallbackError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("refusing entry name {name:?}"),
        )));
    }
    Ok(path.to_path_buf())
}

fn close_sink(sink: SharedSink<BufWriter<File>>) -> io::Result<u64> {
    match sink.try_into_inner() {
        Ok(writer) => {
            let file = writer.into_inner().map_err(io::IntoInnerError::into_error)?;
            Ok(file.metadata()?.len())
        }
        // still shared: flush what we can, the last handle closes the file
        Err(shared) => shared.with(|writer| {
            io::Write::flush(writer)?;
            Ok(writer.get_ref().metadata()?.len())
        }),
    }
}

impl ExtractCallback for DirectoryCallback {
    type Sink = SharedSink<BufWriter<File>>;

    fn request_sink(&mut self, request: &SinkRequest<'_>) -> CallbackResult<Option<Self::Sink>> {
        if let Some(pending) = &self.current {
            return Err(CallbackError::Protocol(format!(
                "file #{} requested before #{} was reported",
                request.index, pending.index
            )));
        }

        let entry = self.entry(request.index)?;

        // names only matter for entries that touch the filesystem
        let file = if request.mode == ExtractMode::Extract {
            let root = request.target_dir.unwrap_or(self.root.as_path());
            let path = root.join(relative_path(&entry.name)?);
            debug!(index = request.index, path = %path.display(), "preparing entry");

            if entry.is_directory {
                fs::create_dir_all(&path)?;
                None
            } else if entry.is_anti {
                Self::remove_anti(&path)?;
                None
            } else {
                let sink = Self::create_file(&path)?;
                Some(OpenFile { path, sink })
            }
        } else {
            None
        };

        let sink = file.as_ref().map(|f| f.sink.clone());
        self.current = Some(Pending {
            index: request.index,
            mode: request.mode,
            file,
        });
        Ok(sink)
    }

    fn begin_operation(&mut self, mode: ExtractMode) -> CallbackResult<()> {
        let pending = self
            .current
            .as_mut()
            .ok_or_else(|| CallbackError::Protocol("operation begun without a request".into()))?;
        pending.mode = mode;
        Ok(())
    }

    fn report_result(&mut self, result: OperationResult) -> CallbackResult<()> {
        let pending = self
            .current
            .take()
            .ok_or_else(|| CallbackError::Protocol("result reported without a request".into()))?;

        let mut bytes = 0;
        if let Some(OpenFile { path, sink }) = pending.file {
            bytes = close_sink(sink)?;
            if !result.is_ok() && !self.keep_corrupted {
                warn!(index = pending.index, path = %path.display(), %result, "removing damaged file");
                fs::remove_file(&path)?;
                bytes = 0;
            }
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
