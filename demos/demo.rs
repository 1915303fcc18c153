//! Small axum app wearing the request log layer.
//!
//! Run with `cargo run --example demo`, then:
//!
//! ```bash
//! curl http://localhost:3000/hello
//! curl -H 'user-agent: DemoAgent/1.0' http://localhost:3000/items/42
//! ```
//!
//! Each request prints a start and an end line under the `turnstile` target.

use std::net::SocketAddr;

use axum::{
    extract::{Path, Request},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Router,
};
use tracing::info;
use turnstile::{AuthUser, HandlerTarget, RequestLogLayer};

async fn hello() -> &'static str {
    "Hello, World!\n"
}

async fn get_item(Path(id): Path<u32>) -> String {
    format!("item {id}\n")
}

/// Stand-in for real authentication and routing metadata: annotates item
/// requests with a user id and the logical handler name so the start line
/// has something to show in those fields.
async fn annotate(mut request: Request, next: Next) -> Response {
    if request.uri().path().starts_with("/items/") {
        request.extensions_mut().insert(AuthUser {
            user_id: "demo-user".to_string(),
        });
        request
            .extensions_mut()
            .insert(HandlerTarget::new("ItemsController", "getItem"));
    }
    next.run(request).await
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "turnstile=info,demo=info".into()),
        )
        .init();

    let app = Router::new()
        .route("/hello", get(hello))
        .route("/items/{id}", get(get_item))
        .layer(RequestLogLayer::default())
        .layer(middleware::from_fn(annotate));

    let addr: SocketAddr = "0.0.0.0:3000".parse().unwrap();
    info!("demo server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}
