//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use api_aggregator::{AppConfig, HttpServer, Shutdown};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub const FORECAST: &str = r#"{"cod":"200","cnt":1,"list":[{"dt":1717243200,"main":{"temp":301.2,"feels_like":300.9,"humidity":40},"weather":[{"main":"Clear","description":"clear sky"}]}],"city":{"name":"Athens","country":"GR"}}"#;

pub const NEWS: &str = r#"{"status":"ok","totalResults":3,"articles":[
    {"source":{"id":null,"name":"Wired"},"title":"older","publishedAt":"2024-06-01T08:00:00Z"},
    {"source":{"id":null,"name":"Ars"},"title":"ars","publishedAt":"2024-06-03T08:00:00Z"},
    {"source":{"id":null,"name":"wired"},"title":"newer","publishedAt":"2024-06-02T08:00:00Z"}
]}"#;

pub const TOKEN: &str = r#"{"access_token":"integration-token","token_type":"Bearer","expires_in":3600}"#;

pub const PLAYLIST: &str = r#"{"id":"3cEYpjA9oz9GiPac4AsH4n","name":"Focus","tracks":{"total":0,"items":[]}}"#;

/// What the mock upstream saw.
#[derive(Debug, Clone)]
pub struct MockRequest {
    pub method: String,
    /// Path and query.
    pub target: String,
    pub authorization: Option<String>,
    pub body: String,
}

impl MockRequest {
    pub fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or_default()
    }
}

pub struct MockUpstream {
    pub addr: SocketAddr,
    seen: Arc<Mutex<Vec<MockRequest>>>,
}

impl MockUpstream {
    pub fn url(&self, prefix: &str) -> String {
        format!("http://{}{}", self.addr, prefix)
    }

    pub fn requests(&self) -> Vec<MockRequest> {
        self.seen.lock().unwrap().clone()
    }

    /// Number of requests whose path starts with `prefix`.
    pub fn hits(&self, prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.path().starts_with(prefix))
            .count()
    }
}

/// Start a programmable mock upstream on an ephemeral port.
pub async fn start_programmable_upstream<F, Fut>(handler: F) -> MockUpstream
where
    F: Fn(MockRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let handler = Arc::new(handler);

    let recorded = seen.clone();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let handler = handler.clone();
            let recorded = recorded.clone();
            tokio::spawn(async move {
                let Some(request) = read_request(&mut socket).await else {
                    return;
                };
                recorded.lock().unwrap().push(request.clone());

                let (status, body) = handler(request).await;
                let response = format!(
                    "HTTP/1.1 {} Mock\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    MockUpstream { addr, seen }
}

/// Mock serving all three upstreams from fixed bodies.
pub async fn start_healthy_upstream() -> MockUpstream {
    start_programmable_upstream(|request| async move { route_healthy(&request) }).await
}

/// Default answers keyed by path prefix.
pub fn route_healthy(request: &MockRequest) -> (u16, String) {
    let path = request.path();
    if path.starts_with("/weather/forecast") {
        (200, FORECAST.to_string())
    } else if path.starts_with("/news/everything") {
        (200, NEWS.to_string())
    } else if path.starts_with("/accounts/api/token") {
        (200, TOKEN.to_string())
    } else if path.starts_with("/spotify/v1/playlists/") {
        (200, PLAYLIST.to_string())
    } else {
        (404, String::new())
    }
}

async fn read_request(socket: &mut TcpStream) -> Option<MockRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();

    let mut content_length = 0;
    let mut authorization = None;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            match name.trim().to_ascii_lowercase().as_str() {
                "content-length" => content_length = value.trim().parse().unwrap_or(0),
                "authorization" => authorization = Some(value.trim().to_string()),
                _ => {}
            }
        }
    }

    while buf.len() < head_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[head_end..]).to_string();

    Some(MockRequest {
        method,
        target,
        authorization,
        body,
    })
}

/// Config pointing every source at `upstream`, with fast retries.
pub fn config_for(upstream: &MockUpstream) -> AppConfig {
    let mut config = AppConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.timeouts.upstream_ms = 2_000;
    config.retries.base_delay_ms = 5;
    config.retries.max_delay_ms = 20;
    config.weather.api_url = upstream.url("/weather");
    config.weather.api_key = "weather-key".to_string();
    config.news.api_url = upstream.url("/news");
    config.news.api_key = "news-key".to_string();
    config.playlist.token_url = upstream.url("/accounts/api/token");
    config.playlist.api_url = upstream.url("/spotify/v1");
    config.playlist.client_id = "client".to_string();
    config.playlist.client_secret = "secret".to_string();
    config
}

/// A running aggregator instance.
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn start_server(config: AppConfig) -> TestServer {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();

    let server = HttpServer::new(config).unwrap();
    let receiver = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, receiver).await;
    });
    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(20)).await;

    TestServer { addr, shutdown }
}
