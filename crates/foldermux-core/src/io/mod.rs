//! I/O wrappers used by the demultiplexer and its callbacks.

pub mod crc;
pub mod shared;

pub use crc::CrcWriter;
pub use shared::SharedSink;
