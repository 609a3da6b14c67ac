//! Core value types shared by the folder demultiplexer and its callbacks.

pub mod descriptor;
pub mod mode;
pub mod outcome;

pub use descriptor::FileDescriptor;
pub use mode::ExtractMode;
pub use outcome::OperationResult;
