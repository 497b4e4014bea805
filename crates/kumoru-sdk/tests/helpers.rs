//! Test helpers: an in-process HTTP responder that records requests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use kumoru_sdk::{Client, Config, Endpoints, Tokens};
use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

pub const PUBLIC_TOKEN: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
pub const PRIVATE_TOKEN: &str = "private-token-value";
pub const ROLE_UUID: &str = "role-0001";

/// A request as the server received it.
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Captured {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Canned response.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Serves canned replies in order (repeating the last one) and records
/// every request.
pub struct MockServer {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<Captured>>>,
    handle: JoinHandle<()>,
}

impl MockServer {
    pub async fn start(replies: Vec<Reply>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = requests.clone();
        let handle = tokio::spawn(async move {
            let mut served = 0usize;
            while let Ok((stream, _)) = listener.accept().await {
                let reply = replies
                    .get(served)
                    .or_else(|| replies.last())
                    .cloned()
                    .unwrap_or_else(|| Reply::new(200, ""));
                served += 1;
                handle_connection(stream, &reply, &recorded).await;
            }
        });

        Self {
            addr,
            requests,
            handle,
        }
    }

    pub async fn reply(status: u16, body: impl Into<String>) -> Self {
        Self::start(vec![Reply::new(status, body)]).await
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn requests(&self) -> Vec<Captured> {
        self.requests.lock().await.clone()
    }

    pub async fn only_request(&self) -> Captured {
        let requests = self.requests().await;
        assert_eq!(requests.len(), 1, "expected exactly one request");
        requests.into_iter().next().expect("one request")
    }

    /// Endpoints that all point at this server.
    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            application: self.url(),
            authorization: self.url(),
            location: self.url(),
            pool: self.url(),
        }
    }

    /// A client signing with the test tokens and role.
    pub fn client(&self) -> Client {
        let config = Config::default()
            .with_endpoints(self.endpoints())
            .with_tokens(test_tokens())
            .with_role(ROLE_UUID);
        Client::new(config)
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn test_tokens() -> Tokens {
    Tokens::new(PUBLIC_TOKEN, PRIVATE_TOKEN)
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n").map(|i| i + 4)
}

async fn handle_connection(mut stream: TcpStream, reply: &Reply, recorded: &Mutex<Vec<Captured>>) -> Option<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        if let Some(end) = find_header_end(&buf) {
            break end;
        }
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = Method::from_bytes(request_line.next()?.as_bytes()).ok()?;
    let target = request_line.next()?.to_string();

    let mut headers = HeaderMap::new();
    for line in lines.filter(|l| !l.is_empty()) {
        let (name, value) = line.split_once(':')?;
        headers.append(
            HeaderName::from_bytes(name.trim().as_bytes()).ok()?,
            HeaderValue::from_str(value.trim()).ok()?,
        );
    }

    let content_length = headers
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = buf[header_end..].to_vec();

    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path.to_string(), Some(query.to_string())),
        None => (target, None),
    };

    recorded.lock().await.push(Captured {
        method,
        path,
        query,
        headers,
        body,
    });

    let response = format!(
        "HTTP/1.1 {} Mock\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        reply.status,
        reply.body.len(),
        reply.body
    );
    stream.write_all(response.as_bytes()).await.ok()?;
    stream.shutdown().await.ok()
}
