//! Solid-folder stream demultiplexing.
//!
//! `foldermux-core` takes the decompressed byte stream of a solid archive
//! folder (several files packed back to back) and splits it into per-file
//! sinks supplied by an [`ExtractCallback`]. Each file's CRC-32 is checked
//! against the archive metadata, and every file gets exactly one
//! [`OperationResult`], even when the stream is cut short.
//!
//! # Examples
//!
//! ```
//! use foldermux_core::DemuxConfig;
//! use foldermux_core::FileDescriptor;
//! use foldermux_core::FolderTable;
//! use foldermux_core::callbacks::MemoryCallback;
//! use foldermux_core::extract_folder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let files = [
//!     FileDescriptor::file(5, Some(crc32fast::hash(b"hello"))),
//!     FileDescriptor::file(5, Some(crc32fast::hash(b"world"))),
//! ];
//! let table = FolderTable::new(&files, 0, &[true, true], false)?;
//! let mut callback = MemoryCallback::new();
//!
//! let summary = extract_folder(&mut &b"helloworld"[..], table, &mut callback, &DemuxConfig::default())?;
//! assert!(summary.is_complete());
//! assert_eq!(callback.output(1), Some(&b"world"[..]));
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod callback;
pub mod callbacks;
pub mod config;
pub mod copy;
pub mod error;
pub mod folder;
pub mod io;
pub mod report;
pub mod types;

// Re-export main API types
pub use api::extract_folder;
pub use callback::CallbackError;
pub use callback::CallbackResult;
pub use callback::CallbackStage;
pub use callback::ExtractCallback;
pub use callback::SinkRequest;
pub use config::DemuxConfig;
pub use config::PrematureWritePolicy;
pub use error::DemuxError;
pub use error::Result;
pub use folder::DemuxState;
pub use folder::FolderDemux;
pub use folder::FolderTable;
pub use folder::Phase;
pub use report::FileRecord;
pub use report::FolderReport;
pub use report::FolderStatus;
pub use report::FolderSummary;

pub use types::ExtractMode;
pub use types::FileDescriptor;
pub use types::OperationResult;
