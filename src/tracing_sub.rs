//! Tracing output for the demo.
//!
//! While the demo owns the terminal, stderr would tear through the alternate
//! screen, so events go to the global [`LogBufferHandle`](crate::log_buffer::LogBufferHandle)
//! and are shown in the log pane under the document. Without a buffer (tests,
//! library use before the demo sets one) they fall back to stderr.

use std::io::{self, Write};

use tracing::Level;

use crate::log_buffer::{LogBufferWriter, global_log_buffer};

/// Per-event writer chosen when the event is formatted.
pub enum PaneWriter {
    Pane(LogBufferWriter),
    Stderr(io::Stderr),
}

impl PaneWriter {
    fn current() -> Self {
        global_log_buffer()
            .map(|log| PaneWriter::Pane(log.writer()))
            .unwrap_or_else(|| PaneWriter::Stderr(io::stderr()))
    }
}

impl Write for PaneWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            PaneWriter::Pane(w) => w.write(buf),
            PaneWriter::Stderr(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            PaneWriter::Pane(w) => w.flush(),
            PaneWriter::Stderr(s) => s.flush(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct LogPaneMakeWriter;

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogPaneMakeWriter {
    type Writer = PaneWriter;

    fn make_writer(&'a self) -> Self::Writer {
        PaneWriter::current()
    }
}

/// Install the fmt subscriber feeding the log pane. Colour codes are off
/// because the pane renders lines as plain text. Later calls are no-ops.
pub fn init_default(level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(LogPaneMakeWriter)
        .with_target(false)
        .with_thread_names(false)
        .with_ansi(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_falls_back_to_stderr_without_buffer() {
        if global_log_buffer().is_none() {
            assert!(matches!(PaneWriter::current(), PaneWriter::Stderr(_)));
        }
    }
}
