//! Integration tests for foldermux-core.
//!
//! These tests drive whole folders through the public API, in memory and
//! against a real directory.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use foldermux_core::CallbackError;
use foldermux_core::CallbackResult;
use foldermux_core::CallbackStage;
use foldermux_core::DemuxConfig;
use foldermux_core::DemuxError;
use foldermux_core::ExtractCallback;
use foldermux_core::ExtractMode;
use foldermux_core::FileDescriptor;
use foldermux_core::FolderDemux;
use foldermux_core::FolderStatus;
use foldermux_core::FolderTable;
use foldermux_core::OperationResult;
use foldermux_core::Phase;
use foldermux_core::SinkRequest;
use foldermux_core::callbacks::CallbackEvent;
use foldermux_core::callbacks::DirectoryCallback;
use foldermux_core::callbacks::MemoryCallback;
use foldermux_core::callbacks::OutputEntry;
use foldermux_core::extract_folder;
use std::fs;
use tempfile::TempDir;

fn crc(data: &[u8]) -> Option<u32> {
    Some(crc32fast::hash(data))
}

#[test]
fn test_hello_scenario_with_skipped_tail() {
    let files = [
        FileDescriptor::file(0, None),
        FileDescriptor::file(5, crc(b"HELLO")),
        FileDescriptor::file(3, None),
    ];
    let modes = vec![ExtractMode::Extract, ExtractMode::Extract, ExtractMode::Skip];
    let table = FolderTable::with_modes(&files, 0, modes).unwrap();
    let mut callback = MemoryCallback::new();
    let mut demux = FolderDemux::new(table, &mut callback, DemuxConfig::default()).unwrap();

    // file 0 is closed before any byte arrives
    assert_eq!(demux.current_index(), Some(1));

    assert_eq!(demux.write_bytes(b"HELLOxyz").unwrap(), 8);
    assert!(demux.is_complete());
    assert_eq!(demux.phase(), Phase::Done);
    assert_eq!(demux.bytes_consumed(), 8);
    assert_eq!(demux.bytes_forwarded(), 5);
    drop(demux);

    assert_eq!(
        callback.events(),
        &[
            CallbackEvent::Request {
                index: 0,
                mode: ExtractMode::Extract
            },
            CallbackEvent::Begin(ExtractMode::Extract),
            CallbackEvent::Result(OperationResult::Ok),
            CallbackEvent::Request {
                index: 1,
                mode: ExtractMode::Extract
            },
            CallbackEvent::Begin(ExtractMode::Extract),
            CallbackEvent::Result(OperationResult::Ok),
            CallbackEvent::Request {
                index: 2,
                mode: ExtractMode::Skip
            },
            CallbackEvent::Begin(ExtractMode::Skip),
            CallbackEvent::Result(OperationResult::Ok),
        ]
    );
    assert_eq!(callback.output(1), Some(&b"HELLO"[..]));
    assert!(callback.output(2).is_none());
}

#[test]
fn test_flush_four_unprocessed_files() {
    let files = [FileDescriptor::file(8, None); 4];
    let table = FolderTable::new(&files, 0, &[true; 4], false).unwrap();
    let mut callback = MemoryCallback::new();
    let mut demux = FolderDemux::new(table, &mut callback, DemuxConfig::default()).unwrap();

    demux.flush_corrupted(OperationResult::DataError).unwrap();
    assert!(demux.is_complete());
    assert_eq!(demux.bytes_consumed(), 0);
    drop(demux);

    assert_eq!(callback.report().len(), 4);
    assert_eq!(callback.report().forced_failures(), 4);
}

#[test]
fn test_single_write_spans_boundary() {
    let files = [FileDescriptor::file(3, None), FileDescriptor::file(3, None)];
    let table = FolderTable::new(&files, 0, &[true, true], false).unwrap();
    let mut callback = MemoryCallback::new();
    let mut demux = FolderDemux::new(table, &mut callback, DemuxConfig::default()).unwrap();

    demux.write_bytes(b"abcde").unwrap();
    assert_eq!(demux.phase(), Phase::Open { local: 1, pos: 2 });
    assert_eq!(demux.callback().results(), vec![(0, OperationResult::Ok)]);

    demux.write_bytes(b"f").unwrap();
    assert!(demux.is_complete());
    drop(demux);

    assert_eq!(callback.output(0), Some(&b"abc"[..]));
    assert_eq!(callback.output(1), Some(&b"def"[..]));
}

#[test]
fn test_exact_fill_drains_trailing_empty_files() {
    let files = [
        FileDescriptor::file(2, None),
        FileDescriptor::file(0, None),
        FileDescriptor::directory(),
        FileDescriptor::file(0, None),
    ];
    let table = FolderTable::new(&files, 0, &[true; 4], false).unwrap();
    let mut callback = MemoryCallback::new();
    let mut demux = FolderDemux::new(table, &mut callback, DemuxConfig::default()).unwrap();

    demux.write_bytes(b"hi").unwrap();
    assert!(demux.is_complete());
    drop(demux);

    assert_eq!(callback.report().len(), 4);
    assert!(callback.report().all_ok());
}

#[test]
fn test_sized_directory_and_anti_consume_no_bytes() {
    let files = [
        FileDescriptor::file(3, None),
        FileDescriptor {
            size: 4096,
            ..FileDescriptor::directory()
        },
        FileDescriptor {
            size: 12,
            ..FileDescriptor::anti()
        },
        FileDescriptor::file(2, None),
    ];
    let table = FolderTable::new(&files, 0, &[true; 4], false).unwrap();
    let mut callback = MemoryCallback::new();
    let mut demux = FolderDemux::new(table, &mut callback, DemuxConfig::default()).unwrap();

    assert_eq!(demux.write_bytes(b"abcde").unwrap(), 5);
    assert!(demux.is_complete());
    assert_eq!(demux.bytes_consumed(), 5);
    drop(demux);

    assert_eq!(callback.output(0), Some(&b"abc"[..]));
    assert_eq!(callback.output(3), Some(&b"de"[..]));
    for index in [1, 2] {
        let record = callback.report().get(index).unwrap();
        assert_eq!(record.result, OperationResult::Ok);
        assert_eq!(record.mode, ExtractMode::Extract);
        assert_eq!(record.bytes, 0);
    }
    let begins: Vec<ExtractMode> = callback
        .events()
        .iter()
        .filter_map(|e| match e {
            CallbackEvent::Begin(mode) => Some(*mode),
            _ => None,
        })
        .collect();
    assert_eq!(begins, vec![ExtractMode::Extract; 4]);
}

#[test]
fn test_trailing_bytes_rejected_across_reads() {
    use std::io::Read;

    let files = [FileDescriptor::file(2, None)];
    let table = FolderTable::new(&files, 0, &[true], false).unwrap();
    let mut reader = (&b"ab"[..]).chain(&b"zz"[..]);
    let err = extract_folder(
        &mut reader,
        table,
        MemoryCallback::new(),
        &DemuxConfig::default(),
    )
    .unwrap_err();

    assert!(matches!(err, DemuxError::PrematureWrite { len: 2 }));
}

#[test]
fn test_empty_files_between_data_files() {
    let files = [
        FileDescriptor::file(1, None),
        FileDescriptor::file(0, crc(b"")),
        FileDescriptor::file(0, None),
        FileDescriptor::file(1, None),
    ];
    let table = FolderTable::new(&files, 0, &[true; 4], false).unwrap();
    let mut callback = MemoryCallback::new();
    let mut demux = FolderDemux::new(table, &mut callback, DemuxConfig::default()).unwrap();

    demux.write_bytes(b"a").unwrap();
    // empties closed as soon as file 0 filled
    assert_eq!(demux.current_index(), Some(3));
    demux.write_bytes(b"b").unwrap();
    drop(demux);

    let indices: Vec<u32> = callback.results().iter().map(|(i, _)| *i).collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);
}

#[test]
fn test_mismatch_does_not_stop_folder() {
    let files = [
        FileDescriptor::file(3, crc(b"not")),
        FileDescriptor::file(3, crc(b"def")),
    ];
    let table = FolderTable::new(&files, 0, &[true, true], false).unwrap();
    let mut callback = MemoryCallback::new();
    let summary =
        extract_folder(&mut &b"abcdef"[..], table, &mut callback, &DemuxConfig::default()).unwrap();

    assert!(summary.is_complete());
    assert_eq!(
        callback.results(),
        vec![
            (0, OperationResult::ChecksumMismatch),
            (1, OperationResult::Ok)
        ]
    );
    assert_eq!(callback.report().failed_indices(), vec![0]);
}

#[test]
fn test_test_mode_verifies_without_output() {
    let files = [
        FileDescriptor::file(3, crc(b"abc")),
        FileDescriptor::file(3, crc(b"xxx")),
    ];
    let table = FolderTable::new(&files, 0, &[true, true], true).unwrap();
    let mut callback = MemoryCallback::new();
    let summary =
        extract_folder(&mut &b"abcdef"[..], table, &mut callback, &DemuxConfig::default()).unwrap();

    assert_eq!(summary.bytes_forwarded, 0);
    assert_eq!(summary.bytes_consumed, 6);
    assert!(callback.outputs().is_empty());
    assert_eq!(callback.report().files_tested(), 1);
    assert_eq!(callback.report().checksum_mismatches(), 1);
}

#[test]
fn test_ref2_offset_and_start_index() {
    let files = [
        FileDescriptor::file(9, None),
        FileDescriptor::file(2, None),
        FileDescriptor::file(2, None),
    ];
    let table = FolderTable::new(&files, 1, &[true, true], false)
        .unwrap()
        .with_ref2_offset(100)
        .unwrap();
    let mut callback = MemoryCallback::new();
    extract_folder(&mut &b"abcd"[..], table, &mut callback, &DemuxConfig::default()).unwrap();

    assert_eq!(
        callback.results(),
        vec![(101, OperationResult::Ok), (102, OperationResult::Ok)]
    );
    assert_eq!(callback.output(102), Some(&b"cd"[..]));
}

#[test]
fn test_truncated_stream() {
    let files = [
        FileDescriptor::file(4, None),
        FileDescriptor::file(4, None),
        FileDescriptor::file(0, None),
    ];
    let table = FolderTable::new(&files, 0, &[true; 3], false).unwrap();
    let mut callback = MemoryCallback::new();
    let summary =
        extract_folder(&mut &b"abcde"[..], table, &mut callback, &DemuxConfig::default()).unwrap();

    assert_eq!(summary.status, FolderStatus::Truncated);
    assert_eq!(
        callback.results(),
        vec![
            (0, OperationResult::Ok),
            (1, OperationResult::UnexpectedEnd),
            (2, OperationResult::UnexpectedEnd),
        ]
    );
}

#[test]
fn test_empty_folder_is_complete_immediately() {
    let files: [FileDescriptor; 0] = [];
    let table = FolderTable::new(&files, 0, &[], false).unwrap();
    let demux = FolderDemux::new(table, MemoryCallback::new(), DemuxConfig::default()).unwrap();
    assert!(demux.is_complete());
    assert_eq!(demux.current_index(), None);
}

/// Callback failing `report_result` for one index.
struct FailingReport {
    fail_at: u32,
    current: u32,
    reported: Vec<u32>,
}

impl ExtractCallback for FailingReport {
    type Sink = std::io::Sink;

    fn request_sink(&mut self, request: &SinkRequest<'_>) -> CallbackResult<Option<Self::Sink>> {
        self.current = request.index;
        Ok(Some(std::io::sink()))
    }

    fn begin_operation(&mut self, _mode: ExtractMode) -> CallbackResult<()> {
        Ok(())
    }

    fn report_result(&mut self, _result: OperationResult) -> CallbackResult<()> {
        if self.current == self.fail_at {
            return Err(CallbackError::Rejected { code: 42 });
        }
        self.reported.push(self.current);
        Ok(())
    }
}

#[test]
fn test_report_rejection_aborts() {
    let files = [FileDescriptor::file(1, None); 3];
    let table = FolderTable::new(&files, 0, &[true; 3], false).unwrap();
    let mut callback = FailingReport {
        fail_at: 1,
        current: 0,
        reported: Vec::new(),
    };
    let mut demux = FolderDemux::new(table, &mut callback, DemuxConfig::default()).unwrap();

    let err = demux.write_bytes(b"abc").unwrap_err();
    match err {
        DemuxError::CallbackRejected {
            index,
            stage,
            source: CallbackError::Rejected { code },
        } => {
            assert_eq!(index, 1);
            assert_eq!(stage, CallbackStage::ReportResult);
            assert_eq!(code, 42);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!demux.is_complete());
    drop(demux);
    assert_eq!(callback.reported, vec![0]);
}

#[test]
fn test_rejection_during_construction() {
    let files = [FileDescriptor::file(0, None), FileDescriptor::file(1, None)];
    let table = FolderTable::new(&files, 0, &[true, true], false).unwrap();
    let result = FolderDemux::new(table, MemoryCallback::new().cancel_at(0), DemuxConfig::default());
    assert!(matches!(result, Err(ref e) if e.is_cancelled()));
}

#[test]
fn test_directory_extraction() {
    let temp = TempDir::new().unwrap();
    let files = [
        FileDescriptor::directory(),
        FileDescriptor::file(5, crc(b"hello")),
        FileDescriptor::file(0, None),
        FileDescriptor::file(3, crc(b"bad")),
        FileDescriptor::file(5, crc(b"world")),
    ];
    let names = ["docs", "docs/a.txt", "docs/empty", "b.bin", "c.txt"];
    let entries = names
        .iter()
        .zip(&files)
        .map(|(name, desc)| OutputEntry::new(*name, desc))
        .collect();

    let table = FolderTable::new(&files, 0, &[true; 5], false).unwrap();
    let mut callback = DirectoryCallback::new(temp.path(), entries).unwrap();
    let summary = extract_folder(
        &mut &b"helloxyzworld"[..],
        table,
        &mut callback,
        &DemuxConfig::default(),
    )
    .unwrap();

    assert!(summary.is_complete());
    assert!(temp.path().join("docs").is_dir());
    assert_eq!(fs::read(temp.path().join("docs/a.txt")).unwrap(), b"hello");
    assert_eq!(fs::read(temp.path().join("docs/empty")).unwrap(), b"");
    assert!(!temp.path().join("b.bin").exists());
    assert_eq!(fs::read(temp.path().join("c.txt")).unwrap(), b"world");

    let report = callback.into_report();
    assert_eq!(report.checksum_mismatches(), 1);
    assert_eq!(report.bytes_written(), 10);
}

#[test]
fn test_directory_extraction_with_target_dir() {
    let root = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    let files = [FileDescriptor::file(2, None)];
    let entries = vec![OutputEntry::new("out.bin", &files[0])];

    let table = FolderTable::new(&files, 0, &[true], false).unwrap();
    let mut callback = DirectoryCallback::new(root.path(), entries).unwrap();
    let config = DemuxConfig::default().with_target_dir(target.path());
    extract_folder(&mut &b"ok"[..], table, &mut callback, &config).unwrap();

    assert!(target.path().join("out.bin").exists());
    assert!(!root.path().join("out.bin").exists());
}

#[test]
fn test_directory_refuses_escaping_name() {
    let temp = TempDir::new().unwrap();
    let files = [FileDescriptor::file(2, None)];
    let entries = vec![OutputEntry::new("../escape", &files[0])];

    let table = FolderTable::new(&files, 0, &[true], false).unwrap();
    let mut callback = DirectoryCallback::new(temp.path(), entries).unwrap();
    let err = extract_folder(&mut &b"ok"[..], table, &mut callback, &DemuxConfig::default())
        .unwrap_err();

    assert!(matches!(
        err,
        DemuxError::CallbackRejected {
            stage: CallbackStage::RequestSink,
            source: CallbackError::Io(_),
            ..
        }
    ));
}
