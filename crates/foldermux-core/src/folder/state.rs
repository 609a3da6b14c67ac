//! Position of the demultiplexer within its folder.

/// Phase of the demultiplexer, derived from [`DemuxState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No file open; `local` is the next file to open.
    Idle {
        /// Local index of the next file.
        local: u32,
    },
    /// File `local` is open and `pos` bytes of it have been emitted.
    Open {
        /// Local index of the open file.
        local: u32,
        /// Bytes emitted so far.
        pos: u64,
    },
    /// Every file of the folder received its result.
    Done,
}

/// Iteration counters of a folder pass.
///
/// Invariant: `current <= count`, `file_open` implies `current < count`,
/// and `file_pos` is zero whenever `file_open` is false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DemuxState {
    current: u32,
    file_open: bool,
    file_pos: u64,
}

impl DemuxState {
    /// State at the start of a pass.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current: 0,
            file_open: false,
            file_pos: 0,
        }
    }

    /// Local index of the active file (equals the file count once done).
    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current
    }

    /// Whether the active file is open.
    #[must_use]
    pub const fn is_file_open(&self) -> bool {
        self.file_open
    }

    /// Bytes emitted into the open file.
    #[must_use]
    pub const fn file_pos(&self) -> u64 {
        self.file_pos
    }

    /// Returns `true` once `count` files have been accounted for.
    #[must_use]
    pub const fn is_done(&self, count: u32) -> bool {
        self.current >= count
    }

    /// Classifies the state for a folder of `count` files.
    #[must_use]
    pub const fn phase(&self, count: u32) -> Phase {
        if self.is_done(count) {
            Phase::Done
        } else if self.file_open {
            Phase::Open {
                local: self.current,
                pos: self.file_pos,
            }
        } else {
            Phase::Idle {
                local: self.current,
            }
        }
    }

    pub(crate) fn open(&mut self) {
        self.file_open = true;
        self.file_pos = 0;
    }

    pub(crate) fn emitted(&mut self, n: u64) {
        self.file_pos += n;
    }

    pub(crate) fn advance(&mut self) {
        self.file_open = false;
        self.file_pos = 0;
        self.current += 1;
    }
}
