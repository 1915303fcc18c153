//! # Turnstile
//!
//! Tower middleware that wraps every HTTP request/response cycle with a pair
//! of log lines tied together by a per-request correlation ID.
//!
//! At request start it logs method, path, authenticated user, user-agent,
//! client IP, and the handler the router dispatched to; when the downstream
//! handler completes it logs status code, content length, and elapsed
//! milliseconds. The middleware is transparent: the request, the response,
//! and any downstream error pass through unchanged.
//!
//! Line formats:
//!
//! ```text
//! [<correlationId>] <method> <path> <userId> <userAgent> <ip>: <controller> <action>
//! [<correlationId>] <method> <path> <statusCode> <contentLength>: <elapsedMs>ms
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use axum::{routing::get, Router};
//! use turnstile::RequestLogLayer;
//!
//! async fn hello() -> &'static str {
//!     "Hello, World!"
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     // Logs through `tracing` under the `turnstile` target.
//!     let app = Router::new()
//!         .route("/hello", get(hello))
//!         .layer(RequestLogLayer::default());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```
//!
//! ## Custom sinks
//!
//! The log destination is an injected capability: anything implementing
//! [`LogSink`]. Tests typically use [`MemorySink`] to assert on the exact
//! lines produced:
//!
//! ```rust
//! use turnstile::{MemorySink, RequestLogLayer};
//!
//! let sink = MemorySink::new();
//! let layer = RequestLogLayer::new(sink.clone());
//! // ...run requests through a router wearing `layer`...
//! assert!(sink.lines().is_empty());
//! ```
//!
//! ## Upstream annotations
//!
//! Two optional request extensions enrich the start line when present:
//! [`AuthUser`], attached by authentication middleware, fills the user field;
//! [`HandlerTarget`], attached per route, fills the controller/action pair.
//! Both render as empty fields when absent.

use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::HttpBody;
use axum::extract::Request;
use axum::http::header;
use axum::response::Response;
use tower::{Layer, Service};

pub mod context;
pub use context::{AuthUser, CallContext, HandlerTarget, HttpCallInfo};

pub mod logger;
pub use logger::{RequestLogger, StartedRequest};

pub mod sink;
pub use sink::{LogSink, MemorySink, TracingSink};

/// Tower layer installing the request logging middleware.
///
/// This is the registration surface for axum/tower hosts; the per-request
/// behavior lives in [`RequestLogger`], which the layer shares with every
/// service it wraps.
#[derive(Clone, Debug)]
pub struct RequestLogLayer {
    logger: RequestLogger,
}

impl RequestLogLayer {
    /// Create a layer logging through the given sink.
    pub fn new<S: LogSink>(sink: S) -> Self {
        Self {
            logger: RequestLogger::new(sink),
        }
    }
}

impl Default for RequestLogLayer {
    /// Layer logging through [`TracingSink`].
    fn default() -> Self {
        Self {
            logger: RequestLogger::default(),
        }
    }
}

impl<S> Layer<S> for RequestLogLayer {
    type Service = RequestLogService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestLogService {
            inner,
            logger: self.logger.clone(),
        }
    }
}

/// Tower service wrapping an inner service with start/end request logging.
///
/// Created by [`RequestLogLayer`]; not used directly.
#[derive(Clone, Debug)]
pub struct RequestLogService<S> {
    inner: S,
    logger: RequestLogger,
}

impl<S> Service<Request> for RequestLogService<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future =
        Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let context = CallContext::Http(HttpCallInfo::from_request(&request));
        let started = self.logger.begin(&context);

        let future = self.inner.call(request);

        Box::pin(async move {
            match future.await {
                Ok(response) => {
                    if let Some(started) = started {
                        started.complete(response.status(), content_length(&response));
                    }
                    Ok(response)
                }
                // Failures propagate untouched; the dropped `started` handle
                // means no end line is written for this invocation.
                Err(error) => Err(error),
            }
        })
    }
}

/// Content length of a completed response.
///
/// The `content-length` header is authoritative when present; for sized
/// bodies that hyper has not serialized yet, the body's exact size hint is
/// the value that header will carry.
fn content_length(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
        .or_else(|| response.body().size_hint().exact())
}
