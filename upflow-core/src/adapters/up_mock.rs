//! Mock Up API server for testing
//!
//! A tiny HTTP server that serves the settled-transactions feed the way
//! the real API does:
//! - GET /transactions?filter[status]=SETTLED returns page 0
//! - GET /transactions/page/{n} returns page n
//! - GET /util/ping returns a ping response
//!
//! Every page body is `{ data: [...], links: { prev, next } }` with `next`
//! pointing back at this server while more pages remain.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

/// Mock Up server for testing
pub struct MockUpServer {
    port: u16,
    running: Arc<AtomicBool>,
    requests: Arc<AtomicUsize>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

/// A transaction served by the mock
#[derive(Debug, Clone)]
pub struct MockRecord {
    pub id: String,
    pub value: String,
    pub settled_at: String,
}

impl MockRecord {
    /// Record with a deterministic UUID derived from `n`
    pub fn new(n: u32, value: &str, settled_at: &str) -> Self {
        Self {
            id: format!("00000000-0000-4000-8000-{:012}", n),
            value: value.to_string(),
            settled_at: settled_at.to_string(),
        }
    }
}

/// Configuration for the mock feed
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Feed pages, newest first
    pub pages: Vec<Vec<MockRecord>>,
    /// Answer every feed request with this status instead
    pub fail_status: Option<u16>,
    /// Answer every feed request with this body instead
    pub raw_body: Option<String>,
}

impl MockUpServer {
    /// Start a new mock server on a random available port
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let requests = Arc::new(AtomicUsize::new(0));

        // Non-blocking so the accept loop notices shutdown
        listener.set_nonblocking(true)?;

        let running_clone = running.clone();
        let requests_clone = requests.clone();
        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let cfg = config.clone();
                        let counter = requests_clone.clone();
                        thread::spawn(move || {
                            handle_connection(stream, &cfg, port, &counter);
                        });
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(std::time::Duration::from_millis(10));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            requests,
            thread_handle: Some(thread_handle),
        })
    }

    /// Base URL for this mock server
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Number of feed requests served so far
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockUpServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn handle_connection(mut stream: TcpStream, config: &MockConfig, port: u16, requests: &AtomicUsize) {
    // Accepted sockets inherit non-blocking mode on some platforms
    let _ = stream.set_nonblocking(false);
    let mut buffer = [0; 4096];

    let n = match stream.read(&mut buffer) {
        Ok(n) => n,
        Err(_) => return,
    };
    let request = String::from_utf8_lossy(&buffer[..n]);

    let first_line = request.lines().next().unwrap_or("");
    let parts: Vec<&str> = first_line.split_whitespace().collect();
    if parts.len() < 2 || parts[0] != "GET" {
        send_response(&mut stream, 400, "Bad Request", r#"{"errors": []}"#);
        return;
    }
    let path = parts[1].split('?').next().unwrap_or("");

    let authorized = request.to_lowercase().contains("authorization: bearer test_");
    if !authorized {
        send_response(&mut stream, 401, "Unauthorized", r#"{"errors": [{"status": "401"}]}"#);
        return;
    }

    if path == "/util/ping" {
        send_response(
            &mut stream,
            200,
            "OK",
            r#"{"meta": {"id": "mock", "statusEmoji": "⚡️"}}"#,
        );
        return;
    }

    let page_index = if path == "/transactions" {
        Some(0)
    } else {
        path.strip_prefix("/transactions/page/")
            .and_then(|n| n.parse::<usize>().ok())
    };

    let Some(page_index) = page_index else {
        send_response(&mut stream, 404, "Not Found", r#"{"errors": [{"status": "404"}]}"#);
        return;
    };

    requests.fetch_add(1, Ordering::SeqCst);

    if let Some(status) = config.fail_status {
        send_response(&mut stream, status, "Error", r#"{"errors": []}"#);
        return;
    }

    if let Some(body) = &config.raw_body {
        send_response(&mut stream, 200, "OK", body);
        return;
    }

    let records = config.pages.get(page_index).cloned().unwrap_or_default();
    let next = if page_index + 1 < config.pages.len() {
        serde_json::Value::String(format!(
            "http://127.0.0.1:{}/transactions/page/{}",
            port,
            page_index + 1
        ))
    } else {
        serde_json::Value::Null
    };

    let data: Vec<serde_json::Value> = records
        .iter()
        .map(|r| {
            serde_json::json!({
                "type": "transactions",
                "id": r.id,
                "attributes": {
                    "status": "SETTLED",
                    "amount": { "currencyCode": "AUD", "value": r.value },
                    "settledAt": r.settled_at
                }
            })
        })
        .collect();

    let body = serde_json::json!({
        "data": data,
        "links": { "prev": null, "next": next }
    });
    send_response(&mut stream, 200, "OK", &body.to_string());
}

fn send_response(stream: &mut TcpStream, status: u16, reason: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}
