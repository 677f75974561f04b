//! Output sink boundary.
//!
//! The session renders to a [`Sink`]: any writable destination that can also
//! say whether it is an interactive terminal. The default sink is standard
//! error. Terminal capability drives the auto setting of the display toggles
//! (overwrite in place, bold highlighting, terminal title), and can be forced
//! on for non-terminal destinations through the `PROGRESS_TTY` environment
//! variable, e.g. to keep ANSI output when piping under a test harness.

use std::io::{self, IsTerminal, Stderr, Write};

/// Environment variable forcing terminal-like rendering on any sink.
pub const PROGRESS_TTY_ENV: &str = "PROGRESS_TTY";

/// A writable rendering destination.
///
/// Writes must land immediately; the session flushes after every chunk and
/// never buffers across renders.
pub trait Sink: Write + Send {
    /// Whether this destination is an interactive terminal.
    ///
    /// Drives auto-detection of in-place overwrite, highlighting, and
    /// terminal-title output.
    fn is_terminal(&self) -> bool {
        false
    }
}

/// The default sink: the process's standard error stream.
pub struct StderrSink(Stderr);

impl StderrSink {
    /// Creates a sink over standard error.
    #[must_use]
    pub fn new() -> Self {
        Self(io::stderr())
    }
}

impl Default for StderrSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for StderrSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl Sink for StderrSink {
    fn is_terminal(&self) -> bool {
        self.0.is_terminal()
    }
}

/// A discard destination is a valid (never terminal) sink; handy for
/// silencing a session entirely.
impl Sink for io::Sink {}

/// Whether a sink should be rendered to as if it were a terminal, honoring
/// the `PROGRESS_TTY` override.
pub(crate) fn terminal_like(sink: &dyn Sink) -> bool {
    sink.is_terminal() || std::env::var_os(PROGRESS_TTY_ENV).is_some()
}

#[cfg(test)]
mod tests {
    use std::io::{self, Write};

    use super::{terminal_like, Sink};

    struct PlainSink;

    impl Write for PlainSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Sink for PlainSink {}

    struct TtySink;

    impl Write for TtySink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Sink for TtySink {
        fn is_terminal(&self) -> bool {
            true
        }
    }

    /// Capability Detection
    /// Terminal sinks report terminal-like; plain sinks do not (assuming the
    /// PROGRESS_TTY override is unset in the test environment).
    #[test]
    fn test_terminal_like() {
        assert!(terminal_like(&TtySink));
        if std::env::var_os(super::PROGRESS_TTY_ENV).is_none() {
            assert!(!terminal_like(&PlainSink));
        }
    }
}
