//! Log sink abstraction.
//!
//! The interceptor never talks to a concrete logging backend directly; it
//! writes each formatted line through a [`LogSink`]. This keeps the middleware
//! testable (swap in [`MemorySink`]) and lets hosts route the lines wherever
//! their process logging goes ([`TracingSink`] is the default).

use std::sync::{Arc, Mutex};

/// A process-wide sink for formatted request log lines.
///
/// Implementations must tolerate concurrent calls from many in-flight
/// requests; the interceptor does no synchronization of its own around the
/// sink.
pub trait LogSink: Send + Sync + 'static {
    /// Append one log line.
    fn log(&self, message: &str);
}

/// Default sink that emits each line through the `tracing` crate.
///
/// Lines are logged at `INFO` level under the `turnstile` target, so hosts
/// can filter or reroute them with the usual `tracing` machinery
/// (e.g. `RUST_LOG=turnstile=info`).
#[derive(Debug, Clone, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, message: &str) {
        tracing::info!(target: "turnstile", "{message}");
    }
}

/// Sink that collects lines in memory.
///
/// Intended for tests and demos that need to assert on exactly what was
/// logged. Clones share the same underlying buffer.
///
/// # Examples
///
/// ```rust
/// use turnstile::{LogSink, MemorySink};
///
/// let sink = MemorySink::new();
/// sink.log("hello");
/// assert_eq!(sink.lines(), vec!["hello".to_string()]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all lines logged so far, in arrival order.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl LogSink for MemorySink {
    fn log(&self, message: &str) {
        self.lines.lock().unwrap().push(message.to_string());
    }
}
