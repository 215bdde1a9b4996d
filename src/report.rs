//! Line-atomic status output shared by all workers.

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;

/// Write one formatted line through a [`Reporter`].
///
/// ```
/// use wavforge::{report, Reporter};
///
/// let (reporter, buffer) = Reporter::memory();
/// report!(reporter, "Encoding {}...", "/music/a.wav");
/// assert_eq!(buffer.lines(), vec!["Encoding /music/a.wav..."]);
/// ```
#[macro_export]
macro_rules! report {
    ($reporter:expr, $($arg:tt)*) => {
        $reporter.report(format_args!($($arg)*))
    };
}

/// Serializes human-readable status lines from many threads onto one stream.
///
/// Each [`report`](Reporter::report) call writes a whole line and flushes it
/// while holding the lock, so lines from different threads never interleave.
/// The order of lines across threads is whatever order they reach the lock.
pub struct Reporter {
    out: Mutex<Box<dyn Write + Send>>,
}

impl Reporter {
    /// Report to an arbitrary writer.
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            out: Mutex::new(Box::new(writer)),
        }
    }

    /// Report to standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Report to standard error.
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    /// Report into memory; the returned buffer reads what was written.
    pub fn memory() -> (Self, ReportBuffer) {
        let buffer = ReportBuffer::default();
        (Self::new(buffer.clone()), buffer)
    }

    /// Append one line built from `args`.
    ///
    /// A trailing newline is added when missing. Write errors are logged and
    /// otherwise ignored: losing a status line must not stop a worker.
    pub fn report(&self, args: fmt::Arguments<'_>) {
        let mut line = args.to_string();
        if !line.ends_with('\n') {
            line.push('\n');
        }

        let mut out = self.out.lock();
        if let Err(e) = write_line(&mut **out, &line) {
            tracing::warn!("Failed to write status line: {}", e);
        }
    }
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter").finish_non_exhaustive()
    }
}

fn write_line(out: &mut dyn Write, line: &str) -> io::Result<()> {
    out.write_all(line.as_bytes())?;
    out.flush()
}

/// In-memory sink returned by [`Reporter::memory`].
#[derive(Debug, Clone, Default)]
pub struct ReportBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl ReportBuffer {
    /// Everything written so far.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock()).into_owned()
    }

    /// Written lines without their newlines.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }
}

impl Write for ReportBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
