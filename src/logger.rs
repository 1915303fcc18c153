//! Interceptor core: correlation ids, timing, and the two log lines.
//!
//! [`RequestLogger`] is framework-agnostic; it works off a [`CallContext`]
//! rather than a raw request, so the same core drives the tower service in
//! `lib.rs` and can be exercised directly in tests. One invocation produces a
//! [`StartedRequest`], which owns the only per-request state there is: the
//! correlation id and the monotonic start instant. Dropping it without
//! calling [`StartedRequest::complete`] (downstream failure, aborted
//! connection) emits nothing, so the end line only ever appears for requests
//! that actually completed.

use std::sync::Arc;
use std::time::Instant;

use axum::http::{Method, StatusCode};
use uuid::Uuid;

use crate::context::{CallContext, HttpCallInfo};
use crate::sink::{LogSink, TracingSink};

/// Emits a start/end log line pair around each HTTP call.
#[derive(Clone)]
pub struct RequestLogger {
    sink: Arc<dyn LogSink>,
}

impl RequestLogger {
    /// Create a logger writing through the given sink.
    pub fn new<S: LogSink>(sink: S) -> Self {
        Self {
            sink: Arc::new(sink),
        }
    }

    /// Begin intercepting a call.
    ///
    /// For HTTP calls this generates a fresh correlation id, emits the start
    /// line, and returns the in-flight handle; the start instant is captured
    /// after the line is written, immediately before the caller delegates
    /// downstream. Non-HTTP calls return `None` and write nothing.
    pub fn begin(&self, context: &CallContext) -> Option<StartedRequest> {
        let info = match context {
            CallContext::Http(info) => info,
            CallContext::Other => return None,
        };

        let correlation_id = Uuid::new_v4();
        self.sink.log(&start_line(&correlation_id, info));

        Some(StartedRequest {
            sink: self.sink.clone(),
            correlation_id,
            method: info.method.clone(),
            path: info.path.clone(),
            started_at: Instant::now(),
        })
    }
}

impl Default for RequestLogger {
    fn default() -> Self {
        Self::new(TracingSink)
    }
}

impl std::fmt::Debug for RequestLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestLogger").finish_non_exhaustive()
    }
}

/// Handle for one in-flight HTTP call.
///
/// Holds the correlation id and start instant for exactly one invocation;
/// neither escapes to any other request.
pub struct StartedRequest {
    sink: Arc<dyn LogSink>,
    correlation_id: Uuid,
    method: Method,
    path: String,
    started_at: Instant,
}

impl StartedRequest {
    /// The correlation id stamped on this request's log lines.
    pub fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    /// Record successful completion: emits the end line with the response
    /// status, content length, and elapsed milliseconds.
    pub fn complete(self, status: StatusCode, content_length: Option<u64>) {
        let elapsed_ms = self.started_at.elapsed().as_millis();
        self.sink.log(&end_line(
            &self.correlation_id,
            &self.method,
            &self.path,
            status,
            content_length,
            elapsed_ms,
        ));
    }
}

impl std::fmt::Debug for StartedRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StartedRequest")
            .field("correlation_id", &self.correlation_id)
            .field("method", &self.method)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

// `[<id>] <method> <path> <userId> <userAgent> <ip>: <controller> <action>`
fn start_line(correlation_id: &Uuid, info: &HttpCallInfo) -> String {
    let user_id = info.user_id.as_deref().unwrap_or("");
    let (controller, action) = info
        .target
        .as_ref()
        .map(|target| (target.controller.as_str(), target.action.as_str()))
        .unwrap_or(("", ""));

    format!(
        "[{correlation_id}] {method} {path} {user_id} {user_agent} {client_ip}: {controller} {action}",
        method = info.method,
        path = info.path,
        user_agent = info.user_agent,
        client_ip = info.client_ip,
    )
}

// `[<id>] <method> <path> <statusCode> <contentLength>: <elapsedMs>ms`
fn end_line(
    correlation_id: &Uuid,
    method: &Method,
    path: &str,
    status: StatusCode,
    content_length: Option<u64>,
    elapsed_ms: u128,
) -> String {
    let content_length = content_length.map(|len| len.to_string()).unwrap_or_default();
    format!(
        "[{correlation_id}] {method} {path} {status} {content_length}: {elapsed_ms}ms",
        status = status.as_u16(),
    )
}
