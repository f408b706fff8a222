//! Scripted HTTP endpoint for exercising the transport.
//!
//! The server answers one connection per scripted response, in order, and
//! hands every request it parsed back to the test through a channel.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Response the mock endpoint sends for one connection.
#[derive(Clone, Debug)]
pub struct MockResponse {
    pub status: u16,
    pub body: Option<String>,
    /// `Content-Length` to advertise instead of the body's real length.
    pub declared_length: Option<usize>,
}

impl MockResponse {
    /// Response with an empty body.
    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: None,
            declared_length: None,
        }
    }

    pub fn with_body(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: Some(body.into()),
            declared_length: None,
        }
    }

    /// Response that promises `declared_length` bytes, sends `body` and then
    /// closes the connection.
    pub fn truncated(status: u16, body: impl Into<String>, declared_length: usize) -> Self {
        Self {
            status,
            body: Some(body.into()),
            declared_length: Some(declared_length),
        }
    }
}

/// Request as seen by the mock endpoint. Header names are lowercased.
#[derive(Clone, Debug)]
pub struct CapturedRequest {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CapturedRequest {
    /// First value of `name`, if present.
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Every header line named `name`, in the order received.
    pub fn header_lines(&self, name: &str) -> Vec<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .filter(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

/// Handle to a running mock endpoint.
pub struct MockServer {
    addr: SocketAddr,
    requests: mpsc::Receiver<CapturedRequest>,
}

impl MockServer {
    /// Serve `responses` as a plain HTTP endpoint.
    pub fn start(responses: Vec<MockResponse>) -> Self {
        Self::spawn(responses, false)
    }

    /// Serve `responses` as an HTTP proxy.
    ///
    /// A `CONNECT` request is captured and acknowledged, then the tunnelled
    /// request is read from the same connection and answered. Requests sent
    /// in absolute form are answered directly.
    pub fn start_proxy(responses: Vec<MockResponse>) -> Self {
        Self::spawn(responses, true)
    }

    fn spawn(responses: Vec<MockResponse>, tunnel: bool) -> Self {
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind ephemeral listener");
        let addr = listener.local_addr().expect("listener has address");
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            for response in responses {
                let Ok((stream, _)) = listener.accept() else {
                    break;
                };
                let _ = serve_connection(stream, &response, tunnel, &tx);
            }
        });

        Self {
            addr,
            requests: rx,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// URL for `path` on this server.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Wait up to `timeout` for the next captured request.
    pub fn next_request(&self, timeout: Duration) -> Option<CapturedRequest> {
        self.requests.recv_timeout(timeout).ok()
    }
}

fn serve_connection(
    mut stream: TcpStream,
    response: &MockResponse,
    tunnel: bool,
    tx: &mpsc::Sender<CapturedRequest>,
) -> Option<()> {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let mut reader = BufReader::new(stream.try_clone().ok()?);

    let mut request = read_http_request(&mut reader)?;
    if tunnel && request.method == "CONNECT" {
        let _ = tx.send(request);
        stream
            .write_all(b"HTTP/1.1 200 Connection established\r\n\r\n")
            .ok()?;
        request = read_http_request(&mut reader)?;
    }

    let body = response.body.clone().unwrap_or_default();
    let reply = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        response.status,
        status_text(response.status),
        response.declared_length.unwrap_or(body.len()),
        body
    );
    let _ = stream.write_all(reply.as_bytes());
    let _ = stream.flush();
    let _ = tx.send(request);
    Some(())
}

fn status_text(code: u16) -> &'static str {
    match code {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        401 => "Unauthorized",
        413 => "Payload Too Large",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// Parses a single header line into a key-value pair.
fn parse_header_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    line.split_once(':')
        .map(|(key, value)| (key.trim().to_lowercase(), value.trim().to_string()))
}

/// Reads all headers from the request and returns them with the content length.
fn read_headers(reader: &mut BufReader<TcpStream>) -> Option<(Vec<(String, String)>, usize)> {
    let mut headers = Vec::new();
    let mut content_length = 0usize;

    loop {
        let mut line = String::new();
        reader.read_line(&mut line).ok()?;
        if line.trim().is_empty() {
            break;
        }
        let Some((key, value)) = parse_header_line(&line) else {
            continue;
        };
        if key == "content-length" {
            content_length = value.parse().unwrap_or(0);
        }
        headers.push((key, value));
    }

    Some((headers, content_length))
}

fn read_http_request(reader: &mut BufReader<TcpStream>) -> Option<CapturedRequest> {
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).ok()? == 0 {
        return None;
    }
    let mut parts = request_line.trim().split(' ');
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts.next().unwrap_or_default().to_string();

    let (headers, content_length) = read_headers(reader)?;
    let mut body = vec![0u8; content_length];
    if content_length > 0 {
        reader.read_exact(&mut body).ok()?;
    }

    Some(CapturedRequest {
        method,
        target,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}
