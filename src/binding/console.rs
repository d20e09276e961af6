//! Output sink passed to handlers

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Where a handler writes its output
pub trait Console: Send {
    /// Standard output stream
    fn out(&mut self) -> &mut dyn Write;

    /// Standard error stream
    fn err(&mut self) -> &mut dyn Write;
}

/// Console bound to the process's stdout and stderr
pub struct StdConsole {
    out: io::Stdout,
    err: io::Stderr,
}

impl StdConsole {
    pub fn new() -> Self {
        Self {
            out: io::stdout(),
            err: io::stderr(),
        }
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for StdConsole {
    fn out(&mut self) -> &mut dyn Write {
        &mut self.out
    }

    fn err(&mut self) -> &mut dyn Write {
        &mut self.err
    }
}

/// In-memory console; clones share the same buffers
#[derive(Clone, Default)]
pub struct BufferConsole {
    out: SharedBuffer,
    err: SharedBuffer,
}

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| io::Error::other("console buffer poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    fn contents(&self) -> String {
        self.0
            .lock()
            .map(|b| String::from_utf8_lossy(&b).into_owned())
            .unwrap_or_default()
    }
}

impl BufferConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written to the output stream so far
    pub fn stdout(&self) -> String {
        self.out.contents()
    }

    /// Everything written to the error stream so far
    pub fn stderr(&self) -> String {
        self.err.contents()
    }
}

impl Console for BufferConsole {
    fn out(&mut self) -> &mut dyn Write {
        &mut self.out
    }

    fn err(&mut self) -> &mut dyn Write {
        &mut self.err
    }
}
