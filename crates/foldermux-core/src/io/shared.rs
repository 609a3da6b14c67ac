//! Shared write handle.

use std::cell::Ref;
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

/// Clonable handle to a writer owned elsewhere.
///
/// Callbacks keep one clone and give another to the demultiplexer. Dropping
/// the demultiplexer's clone leaves the writer alive, so the callback can
/// flush, inspect or discard it when the file's result arrives.
///
/// # Examples
///
/// ```
/// use foldermux_core::io::SharedSink;
/// use std::io::Write;
///
/// let kept = SharedSink::new(Vec::new());
/// let mut handed_out = kept.clone();
/// handed_out.write_all(b"abc")?;
/// drop(handed_out);
///
/// assert_eq!(kept.borrow().as_slice(), b"abc");
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct SharedSink<W>(Rc<RefCell<W>>);

impl<W> SharedSink<W> {
    /// Wraps a writer in a shared handle.
    #[must_use]
    pub fn new(inner: W) -> Self {
        Self(Rc::new(RefCell::new(inner)))
    }

    /// Borrows the underlying writer.
    ///
    /// # Panics
    ///
    /// Panics if the writer is currently being written through another handle.
    #[must_use]
    pub fn borrow(&self) -> Ref<'_, W> {
        self.0.borrow()
    }

    /// Runs `f` with mutable access to the underlying writer.
    pub fn with<T>(&self, f: impl FnOnce(&mut W) -> T) -> T {
        f(&mut self.0.borrow_mut())
    }

    /// Returns the writer if this is the last handle.
    ///
    /// # Errors
    ///
    /// Returns the handle unchanged while other clones are alive.
    pub fn try_into_inner(self) -> Result<W, Self> {
        Rc::try_unwrap(self.0)
            .map(RefCell::into_inner)
            .map_err(Self)
    }

    /// Returns the number of live handles.
    #[must_use]
    pub fn handle_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }
}

impl<W> Clone for SharedSink<W> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<W: Write> Write for SharedSink<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0.borrow_mut().flush()
    }
}
