//! Solid-folder demultiplexing.
//!
//! A solid folder decompresses to one byte stream holding several files
//! back to back. [`FolderDemux`] consumes that stream and routes each run of
//! bytes to the sink of the file it belongs to, using the sizes recorded in
//! the [`FolderTable`].

mod demux;
mod flush;
pub mod state;
pub mod table;

pub use demux::FolderDemux;
pub use state::DemuxState;
pub use state::Phase;
pub use table::FolderTable;
