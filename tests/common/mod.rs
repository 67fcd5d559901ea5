//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{HeaderName, HeaderValue, Request},
    response::Response,
    Router,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use upstream_proxy::{HttpServer, ProxyConfig, Shutdown};

/// A running stub upstream and the number of connections/requests it saw.
pub struct Upstream {
    pub addr: SocketAddr,
    pub hits: Arc<AtomicUsize>,
}

impl Upstream {
    pub fn origin(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// A proxy bound to an ephemeral port; shut down on drop.
pub struct Proxy {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl Proxy {
    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{}", self.addr, path_and_query)
    }
}

impl Drop for Proxy {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn start_proxy(config: ProxyConfig) -> Proxy {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    Proxy { addr, shutdown }
}

pub async fn start_proxy_to(origin: &str) -> Proxy {
    start_proxy(ProxyConfig::with_upstream(origin)).await
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap()
}

/// Start an axum upstream serving `app` on every path.
pub async fn start_axum_upstream(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Start an upstream that echoes what it received.
///
/// Response headers: `x-echo-method`, `x-echo-uri`, `x-echo-body-len`, and
/// every request header repeated as `x-echo-req-<name>`. Response body is the
/// request body.
pub async fn start_echo_upstream() -> Upstream {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new().fallback(echo).with_state(hits.clone());
    let addr = start_axum_upstream(app).await;
    Upstream { addr, hits }
}

async fn echo(State(hits): State<Arc<AtomicUsize>>, request: Request<Body>) -> Response {
    hits.fetch_add(1, Ordering::SeqCst);

    let (parts, body) = request.into_parts();
    let body = to_bytes(body, usize::MAX).await.unwrap();

    let mut response = Response::new(Body::from(body.clone()));
    let headers = response.headers_mut();
    headers.insert(
        "x-echo-method",
        HeaderValue::from_str(parts.method.as_str()).unwrap(),
    );
    headers.insert(
        "x-echo-uri",
        HeaderValue::from_str(&parts.uri.to_string()).unwrap(),
    );
    headers.insert("x-echo-body-len", HeaderValue::from(body.len()));
    for (name, value) in parts.headers.iter() {
        let echoed = HeaderName::from_bytes(format!("x-echo-req-{}", name).as_bytes()).unwrap();
        headers.append(echoed, value.clone());
    }
    response
}

/// Start an upstream that answers every connection with the same raw bytes.
pub async fn start_raw_upstream(response: &'static str) -> Upstream {
    start_tcp_upstream(move |mut socket| async move {
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
    })
    .await
}

/// Start an upstream that reads the request and closes without answering.
pub async fn start_hangup_upstream() -> Upstream {
    start_tcp_upstream(|socket| async move { drop(socket) }).await
}

/// Start an upstream that answers only after `delay`.
pub async fn start_slow_upstream(delay: Duration) -> Upstream {
    start_tcp_upstream(move |mut socket| async move {
        tokio::time::sleep(delay).await;
        let _ = socket
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 4\r\nConnection: close\r\n\r\nlate")
            .await;
    })
    .await
}

async fn start_tcp_upstream<F, Fut>(respond: F) -> Upstream
where
    F: Fn(TcpStream) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let respond = Arc::new(respond);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            let respond = respond.clone();
            tokio::spawn(async move {
                read_head(&mut socket).await;
                respond(socket).await;
            });
        }
    });

    Upstream { addr, hits }
}

/// Consume bytes up to the end of the request head.
async fn read_head(socket: &mut TcpStream) {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
}

/// Send a hand-written HTTP/1.1 request and return the raw response.
///
/// The request should carry `Connection: close` so the read terminates.
pub async fn raw_request(addr: SocketAddr, request: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    String::from_utf8_lossy(&response).into_owned()
}

/// Value of `name` in a raw response head (names compared case-insensitively).
pub fn raw_header<'a>(response: &'a str, name: &str) -> Option<&'a str> {
    let head = response.split("\r\n\r\n").next()?;
    head.lines().skip(1).find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim()
            .eq_ignore_ascii_case(name)
            .then(|| value.trim())
    })
}
