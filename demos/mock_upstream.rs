//! A tiny upstream to point the proxy at during manual testing.
//!
//! ```text
//! cargo run --example mock_upstream
//! cargo run -- --upstream http://127.0.0.1:3000 --bind 127.0.0.1:8080
//! curl -i 'http://127.0.0.1:8080/v1/models?key=ABC'
//! ```

use axum::{
    body::Bytes,
    http::{HeaderMap, Method, StatusCode, Uri},
    routing::get,
    Router,
};
use std::net::SocketAddr;

#[tokio::main]
async fn main() {
    let app = Router::new()
        .route("/status", get(|| async { "Upstream is healthy" }))
        .route("/teapot", get(|| async { (StatusCode::IM_A_TEAPOT, "short and stout") }))
        .fallback(echo);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    println!("Mock upstream listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> String {
    let mut out = format!("{method} {uri}\n");
    for (name, value) in headers.iter() {
        out.push_str(&format!("{}: {}\n", name, value.to_str().unwrap_or("<binary>")));
    }
    out.push('\n');
    out.push_str(&String::from_utf8_lossy(&body));
    out
}
