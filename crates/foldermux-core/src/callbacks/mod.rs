//! Ready-made [`ExtractCallback`](crate::ExtractCallback) implementations.

pub mod directory;
pub mod memory;

pub use directory::DirectoryCallback;
pub use directory::OutputEntry;
pub use memory::CallbackEvent;
pub use memory::MemoryCallback;
