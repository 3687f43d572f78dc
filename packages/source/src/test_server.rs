//! Minimal local HTTP servers for exercising the HTTP source and retry
//! paths without network access.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _};
use tokio::net::TcpListener;

/// A `200 OK` response carrying `body`.
pub fn ok(body: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/csv\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

/// An empty response with the given status line (e.g. `"503 Service Unavailable"`).
pub fn status(line: &str) -> String {
    format!("HTTP/1.1 {line}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
}

/// A `200 OK` whose body ends before its declared length.
pub fn truncated() -> String {
    "HTTP/1.1 200 OK\r\nContent-Length: 100\r\nConnection: close\r\n\r\npartial".to_string()
}

async fn bind() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/export.csv", listener.local_addr().unwrap());
    (listener, url)
}

/// Serves `responses` in order, one per connection, repeating the last one.
/// Returns the URL and a counter of connections accepted.
pub async fn canned(responses: Vec<String>) -> (String, Arc<AtomicUsize>) {
    let (listener, url) = bind().await;
    let count = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&count);

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let n = counter.fetch_add(1, Ordering::SeqCst);
            let response = responses
                .get(n)
                .or_else(|| responses.last())
                .cloned()
                .unwrap_or_default();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (url, count)
}

/// Accepts connections and never answers them. Returns the URL and a
/// counter of connections accepted.
pub async fn stalled() -> (String, Arc<AtomicUsize>) {
    let (listener, url) = bind().await;
    let count = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&count);

    tokio::spawn(async move {
        let mut open = Vec::new();
        loop {
            let Ok((socket, _)) = listener.accept().await else {
                return;
            };
            counter.fetch_add(1, Ordering::SeqCst);
            open.push(socket);
        }
    });

    (url, count)
}
