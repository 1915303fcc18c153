//! Execution-context model for intercepted calls.
//!
//! The interceptor core never inspects a raw framework request; it works off
//! a [`CallContext`], which is either an HTTP call with the handful of fields
//! the log lines need, or some other invocation kind the interceptor ignores.
//! [`HttpCallInfo::from_request`] builds the HTTP variant from an axum
//! request, reading the extensions upstream middleware is expected to attach.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request};
use axum::http::header;

/// The kind of call flowing through the pipeline.
///
/// Only HTTP calls are logged; anything else passes through untouched.
#[derive(Debug, Clone)]
pub enum CallContext {
    /// An HTTP request/response cycle.
    Http(HttpCallInfo),
    /// Any non-HTTP invocation the host pipeline supports.
    Other,
}

/// Request metadata extracted for the start log line.
#[derive(Debug, Clone)]
pub struct HttpCallInfo {
    /// HTTP method (GET, POST, ...).
    pub method: axum::http::Method,
    /// Request path, query excluded.
    pub path: String,
    /// Resolved client IP, empty when unknown.
    pub client_ip: String,
    /// `User-Agent` header value, empty when absent.
    pub user_agent: String,
    /// Authenticated user id attached by upstream auth middleware, if any.
    pub user_id: Option<String>,
    /// Logical handler the router dispatched to, if annotated.
    pub target: Option<HandlerTarget>,
}

impl HttpCallInfo {
    /// Extract call metadata from an axum request.
    ///
    /// Reads the [`AuthUser`] and [`HandlerTarget`] extensions when present;
    /// both are optional and their absence is not an error. The client IP is
    /// resolved proxy-first: `x-forwarded-for` (first hop), then `x-real-ip`,
    /// then the socket address from [`ConnectInfo`].
    pub fn from_request(request: &Request) -> Self {
        let user_agent = request
            .headers()
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
            .to_string();

        Self {
            method: request.method().clone(),
            path: request.uri().path().to_string(),
            client_ip: client_ip(request),
            user_agent,
            user_id: request
                .extensions()
                .get::<AuthUser>()
                .map(|user| user.user_id.clone()),
            target: request.extensions().get::<HandlerTarget>().cloned(),
        }
    }
}

/// Authenticated-user identity attached to the request by upstream
/// authentication middleware.
///
/// The interceptor only reads this; it never authenticates anything itself.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Stable identifier of the authenticated principal.
    pub user_id: String,
}

/// Logical name of the handler a request was routed to, for the start log
/// line (`ItemsController getItem` style).
///
/// axum has no controller notion of its own, so hosts that want this field
/// populated attach it per route, typically from a thin routing macro or a
/// `map_request` layer.
#[derive(Debug, Clone)]
pub struct HandlerTarget {
    /// Controller / handler-group name.
    pub controller: String,
    /// Action / method name within the controller.
    pub action: String,
}

impl HandlerTarget {
    pub fn new(controller: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            controller: controller.into(),
            action: action.into(),
        }
    }
}

fn client_ip(request: &Request) -> String {
    let headers = request.headers();
    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
    {
        if let Some(first_hop) = forwarded.split(',').next() {
            let first_hop = first_hop.trim();
            if !first_hop.is_empty() {
                return first_hop.to_string();
            }
        }
    }
    if let Some(real_ip) = headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
    {
        return real_ip.to_string();
    }
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_default()
}
