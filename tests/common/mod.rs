//! Shared mock backend for the integration suites.
//!
//! Stands in for the spreadsheet-script endpoint: records every request
//! and answers through a test-provided responder, so the suites can
//! assert on transports used, attempt counts, and request shapes.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use tiny_http::{Response, Server};

/// One request as the mock saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub body: String,
}

/// A mock backend bound to an ephemeral local port.
pub struct MockBackend {
    server: Arc<Server>,
    pub endpoint: String,
    hits: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: Option<JoinHandle<()>>,
}

impl MockBackend {
    /// Start the mock with a responder mapping each request to
    /// `(status, body)`.
    pub fn spawn<F>(responder: F) -> Self
    where
        F: Fn(&RecordedRequest) -> (u16, String) + Send + 'static,
    {
        let server = Arc::new(Server::http("127.0.0.1:0").expect("failed to bind mock server"));
        let port = server
            .server_addr()
            .to_ip()
            .expect("mock server has an IP address")
            .port();
        let endpoint = format!("http://127.0.0.1:{port}/exec");
        let hits: Arc<Mutex<Vec<RecordedRequest>>> = Arc::new(Mutex::new(Vec::new()));

        let worker_server = Arc::clone(&server);
        let worker_hits = Arc::clone(&hits);
        let handle = std::thread::spawn(move || {
            for mut request in worker_server.incoming_requests() {
                let mut body = String::new();
                let _ = request.as_reader().read_to_string(&mut body);
                let recorded = RecordedRequest {
                    method: request.method().to_string(),
                    url: request.url().to_string(),
                    body,
                };
                let (status, reply) = responder(&recorded);
                worker_hits.lock().unwrap().push(recorded);
                let _ = request.respond(Response::from_string(reply).with_status_code(status));
            }
        });

        Self {
            server,
            endpoint,
            hits,
            handle: Some(handle),
        }
    }

    pub fn hits(&self) -> Vec<RecordedRequest> {
        self.hits.lock().unwrap().clone()
    }

    pub fn hit_count(&self) -> usize {
        self.hits.lock().unwrap().len()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

// ---------------------------------------------------------------------------
// Request/response helpers
// ---------------------------------------------------------------------------

/// Extract one query parameter without decoding (fine for the plain
/// values the suites assert on).
pub fn query_param(url: &str, key: &str) -> Option<String> {
    url.split('?').nth(1)?.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        if k == key { Some(v.to_string()) } else { None }
    })
}

/// The operation name of a recorded request, whichever transport carried
/// it: the `action` query parameter on GET, the `action` body field on
/// POST.
pub fn action_of(request: &RecordedRequest) -> String {
    if request.method == "GET" {
        return query_param(&request.url, "action").unwrap_or_default();
    }
    serde_json::from_str::<serde_json::Value>(&request.body)
        .ok()
        .and_then(|v| v.get("action").and_then(|a| a.as_str()).map(str::to_string))
        .unwrap_or_default()
}

/// A success envelope around `data`.
pub fn ok_envelope(data: serde_json::Value) -> String {
    serde_json::json!({ "success": true, "data": data }).to_string()
}

/// A server-reported failure envelope.
pub fn error_envelope(message: &str) -> String {
    serde_json::json!({ "success": false, "error": message }).to_string()
}
