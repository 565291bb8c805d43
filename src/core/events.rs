//! Booking event sinks.
//!
//! The dispatcher renders each booking event as `<booking>: <message>` and
//! hands the line to a sink. Stdout is the default; the in-memory sink keeps a
//! bounded buffer for tests and dev tooling.

use std::collections::VecDeque;
use std::fmt::Display;
use std::io::Write;

use parking_lot::Mutex;

/// Destination for rendered booking events.
///
/// Implementations must not panic and should not block meaningfully.
pub trait EventSink: Send + Sync {
    /// Record one rendered event line.
    fn record(&self, line: &str);
}

/// Writes each event line to standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutEventSink;

impl EventSink for StdoutEventSink {
    fn record(&self, line: &str) {
        // Write errors are ignored.
        let _ = writeln!(std::io::stdout().lock(), "{line}");
    }
}

/// In-memory event sink with a bounded buffer.
#[derive(Debug)]
pub struct InMemoryEventSink {
    lines: Mutex<VecDeque<String>>,
    max_lines: usize,
}

impl InMemoryEventSink {
    /// Create a sink that keeps the most recent `max_lines` events.
    #[must_use]
    pub fn new(max_lines: usize) -> Self {
        Self {
            lines: Mutex::new(VecDeque::with_capacity(max_lines.min(1024))),
            max_lines,
        }
    }

    /// Snapshot of the stored lines, oldest first.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().iter().cloned().collect()
    }

    /// Number of stored lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    /// Whether no line has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }
}

impl EventSink for InMemoryEventSink {
    fn record(&self, line: &str) {
        if self.max_lines == 0 {
            return;
        }
        let mut lines = self.lines.lock();
        if lines.len() >= self.max_lines {
            lines.pop_front();
        }
        lines.push_back(line.to_owned());
    }
}

/// Render an event line exactly as `<subject>: <message>`.
pub fn render_event(subject: &dyn Display, message: &str) -> String {
    format!("{subject}: {message}")
}
