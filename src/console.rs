//! The caller's output streams.
//!
//! Everything prp-runner prints itself goes through a [`Console`] so that
//! tests can capture it. Child processes that inherit stdio bypass it.

use std::io::Write;

/// Borrowed standard output and standard error.
pub struct Console<'a> {
    pub out: &'a mut dyn Write,
    pub err: &'a mut dyn Write,
}

impl<'a> Console<'a> {
    pub fn new(out: &'a mut dyn Write, err: &'a mut dyn Write) -> Self {
        Self { out, err }
    }

    /// Flush both streams; called before a child takes over the terminal.
    pub fn flush(&mut self) -> std::io::Result<()> {
        self.out.flush()?;
        self.err.flush()
    }
}
