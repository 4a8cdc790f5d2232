//! Test utilities and mocks for ngjest unit tests.
//!
//! This module provides stand-ins for the registry, both at the `Source`
//! level and at the HTTP level, plus helpers that lay out a workspace on disk.
//!
//! # Example
//!
//! ```rust,ignore
//! use ngjest::test_support::{create_test_workspace, angular_workspace, StubRegistry};
//!
//! #[test]
//! fn test_example() {
//!     let (_tmp, files) = create_test_workspace(&json!({}), &angular_workspace(&[("app", true)]));
//!     let registry = StubRegistry::new().with_version("jest", "29.0.0");
//!
//!     // Run a migration against `files` and `registry`...
//! }
//! ```

pub mod fixtures;

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use url::Url;

use crate::core::PackageVersion;
use crate::sources::{LookupError, Source};

// Re-export fixtures for convenience
pub use fixtures::*;

/// How the stub answers a lookup.
#[derive(Debug, Clone)]
enum StubAnswer {
    Version(String),
    MissingLatest,
    Status(u16),
}

/// Holds each lookup until `parties` lookups are in flight at once.
#[derive(Debug)]
struct Rendezvous {
    parties: usize,
    arrived: Mutex<usize>,
    all_here: Condvar,
    missed: AtomicBool,
}

impl Rendezvous {
    /// Upper bound on the wait, so a sequential caller fails instead of hanging.
    const TIMEOUT: Duration = Duration::from_secs(5);

    fn wait(&self) {
        let mut arrived = self.arrived.lock().unwrap();
        *arrived += 1;
        self.all_here.notify_all();

        let (_arrived, result) = self
            .all_here
            .wait_timeout_while(arrived, Self::TIMEOUT, |n| *n < self.parties)
            .unwrap();
        if result.timed_out() {
            self.missed.store(true, Ordering::SeqCst);
        }
    }
}

/// In-memory `Source` with per-package answers and delays.
///
/// Unknown packages answer with HTTP 404. Lookups record their name when
/// they complete, so tests can observe completion order.
#[derive(Debug, Default)]
pub struct StubRegistry {
    answers: HashMap<String, StubAnswer>,
    delays: HashMap<String, Duration>,
    rendezvous: Option<Rendezvous>,
    completed: Mutex<Vec<String>>,
}

impl StubRegistry {
    /// Create a stub that knows no packages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `name` with `version`.
    pub fn with_version(mut self, name: &str, version: &str) -> Self {
        self.answers
            .insert(name.to_string(), StubAnswer::Version(version.to_string()));
        self
    }

    /// Answer `name` with `version` after sleeping for `delay`.
    pub fn with_delayed_version(self, name: &str, version: &str, delay: Duration) -> Self {
        let mut stub = self.with_version(name, version);
        stub.delays.insert(name.to_string(), delay);
        stub
    }

    /// Answer `name` with a packument that has no `latest` tag.
    pub fn with_missing_latest(mut self, name: &str) -> Self {
        self.answers
            .insert(name.to_string(), StubAnswer::MissingLatest);
        self
    }

    /// Answer `name` with an HTTP error status.
    pub fn with_status(mut self, name: &str, status: u16) -> Self {
        self.answers
            .insert(name.to_string(), StubAnswer::Status(status));
        self
    }

    /// Make every lookup wait until `parties` lookups are running at once.
    pub fn with_rendezvous(mut self, parties: usize) -> Self {
        self.rendezvous = Some(Rendezvous {
            parties,
            arrived: Mutex::new(0),
            all_here: Condvar::new(),
            missed: AtomicBool::new(false),
        });
        self
    }

    /// Whether all rendezvous parties were in flight together.
    pub fn rendezvous_met(&self) -> bool {
        self.rendezvous.as_ref().is_some_and(|r| {
            *r.arrived.lock().unwrap() == r.parties && !r.missed.load(Ordering::SeqCst)
        })
    }

    /// The version `name` resolves to, if any.
    pub fn version_of(&self, name: &str) -> Option<&str> {
        match self.answers.get(name) {
            Some(StubAnswer::Version(v)) => Some(v),
            _ => None,
        }
    }

    /// Names of completed lookups, in completion order.
    pub fn completed(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }
}

impl Source for StubRegistry {
    fn name(&self) -> &str {
        "stub"
    }

    fn latest_version(&self, name: &str) -> Result<PackageVersion, LookupError> {
        if let Some(rendezvous) = &self.rendezvous {
            rendezvous.wait();
        }
        if let Some(delay) = self.delays.get(name) {
            thread::sleep(*delay);
        }
        self.completed.lock().unwrap().push(name.to_string());

        match self.answers.get(name) {
            Some(StubAnswer::Version(v)) => Ok(PackageVersion::new(name, v.as_str())),
            Some(StubAnswer::MissingLatest) => Err(LookupError::MissingLatest {
                package: name.to_string(),
            }),
            Some(StubAnswer::Status(status)) => Err(LookupError::Status {
                package: name.to_string(),
                status: *status,
            }),
            None => Err(LookupError::Status {
                package: name.to_string(),
                status: 404,
            }),
        }
    }
}

/// Canned HTTP response served by `MockHttpServer`.
#[derive(Debug, Clone)]
pub struct MockHttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: Vec<u8>,
}

impl MockHttpResponse {
    /// Create a successful JSON response with the given body.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        MockHttpResponse {
            status: 200,
            headers: HashMap::from([("Content-Type".to_string(), "application/json".to_string())]),
            body: body.into(),
        }
    }

    /// Create a not found response.
    pub fn not_found() -> Self {
        MockHttpResponse {
            status: 404,
            headers: HashMap::new(),
            body: b"Not Found".to_vec(),
        }
    }

    /// Create a server error response.
    pub fn server_error(message: &str) -> Self {
        MockHttpResponse {
            status: 500,
            headers: HashMap::new(),
            body: message.as_bytes().to_vec(),
        }
    }

    fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            404 => "Not Found",
            500 => "Internal Server Error",
            _ => "Unknown",
        }
    }
}

/// A request received by `MockHttpServer`.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Raw request target, percent-encoding preserved
    pub path: String,
    headers: Vec<(String, String)>,
}

impl RecordedRequest {
    /// Value of a header, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.clone())
    }
}

/// Minimal HTTP/1.1 server on a loopback port.
///
/// Serves fixed responses by exact request path and answers 404 otherwise.
/// Each connection carries one request.
pub struct MockHttpServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl MockHttpServer {
    /// Bind a loopback port and start serving `routes`.
    pub fn start(routes: Vec<(&str, MockHttpResponse)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind mock server");
        let addr = listener.local_addr().expect("mock server has no address");

        let routes: HashMap<String, MockHttpResponse> = routes
            .into_iter()
            .map(|(path, response)| (path.to_string(), response))
            .collect();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let shutdown = Arc::new(AtomicBool::new(false));

        let handle = {
            let requests = Arc::clone(&requests);
            let shutdown = Arc::clone(&shutdown);
            thread::spawn(move || {
                for stream in listener.incoming() {
                    if shutdown.load(Ordering::SeqCst) {
                        break;
                    }
                    if let Ok(stream) = stream {
                        serve(stream, &routes, &requests);
                    }
                }
            })
        };

        MockHttpServer {
            addr,
            requests,
            shutdown,
            handle: Some(handle),
        }
    }

    /// Base URL of the server, ending in `/`.
    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}/", self.addr)).expect("valid mock server URL")
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for MockHttpServer {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        // Wake the accept loop.
        let _ = TcpStream::connect(self.addr);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn serve(
    stream: TcpStream,
    routes: &HashMap<String, MockHttpResponse>,
    requests: &Mutex<Vec<RecordedRequest>>,
) {
    let Some(request) = read_request(&stream) else {
        return;
    };

    let response = routes
        .get(&request.path)
        .cloned()
        .unwrap_or_else(MockHttpResponse::not_found);
    requests.lock().unwrap().push(request);

    let mut stream = stream;
    let mut head = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        response.status,
        response.reason(),
        response.body.len()
    );
    for (key, value) in &response.headers {
        head.push_str(&format!("{}: {}\r\n", key, value));
    }
    head.push_str("\r\n");

    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(&response.body);
    let _ = stream.flush();
}

fn read_request(stream: &TcpStream) -> Option<RecordedRequest> {
    let mut reader = BufReader::new(stream);

    let mut line = String::new();
    reader.read_line(&mut line).ok()?;
    let mut parts = line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).ok()? == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((key, value)) = line.split_once(':') {
            headers.push((key.trim().to_string(), value.trim().to_string()));
        }
    }

    Some(RecordedRequest {
        method,
        path,
        headers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_stub_registry_answers() {
        let stub = StubRegistry::new()
            .with_version("jest", "29.0.0")
            .with_missing_latest("broken")
            .with_status("private", 403);

        assert_eq!(
            stub.latest_version("jest").unwrap(),
            PackageVersion::new("jest", "29.0.0")
        );
        assert!(matches!(
            stub.latest_version("broken"),
            Err(LookupError::MissingLatest { .. })
        ));
        assert!(matches!(
            stub.latest_version("private"),
            Err(LookupError::Status { status: 403, .. })
        ));
        assert!(matches!(
            stub.latest_version("unknown"),
            Err(LookupError::Status { status: 404, .. })
        ));
        assert_eq!(stub.completed(), ["jest", "broken", "private", "unknown"]);
    }

    #[test]
    fn test_mock_server_routes() {
        let server = MockHttpServer::start(vec![("/jest", MockHttpResponse::ok("{}"))]);

        let mut stream = TcpStream::connect(server.addr).unwrap();
        stream
            .write_all(b"GET /jest HTTP/1.1\r\nHost: localhost\r\nX-Test: yes\r\n\r\n")
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).unwrap();

        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.ends_with("{}"));
        let requests = server.requests();
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[0].header("x-test").as_deref(), Some("yes"));
    }
}
