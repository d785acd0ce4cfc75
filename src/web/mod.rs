//! Embedded LAN dashboard for traindash.
//!
//! A lightweight HTTP server (sync, via `tiny_http`) that re-exposes the
//! backend's operations catalogue as local JSON endpoints plus a minimal
//! single-page frontend. Meant for the school LAN: one process, requests
//! handled sequentially, every request insulated so one failure never
//! takes the server down.
//!
//! Launched via `traindash serve` (default: `http://127.0.0.1:9747`).

mod api;
mod frontend;

use std::io::Cursor;

use anyhow::Result;
use tiny_http::{Header, Method, Response, Server, StatusCode};

use crate::api::ApiClient;
use crate::config::TraindashConfig;

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the dashboard server on the given address.
///
/// Blocks the current thread and handles requests sequentially —
/// sufficient for a staff-room dashboard. Per-request errors become JSON
/// 500 bodies without crashing the server.
pub fn serve(addr: &str, client: ApiClient, config: &TraindashConfig) -> Result<()> {
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    println!("traindash dashboard running at http://{addr}");
    println!("Press Ctrl+C to stop.\n");

    for mut request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        let body = if matches!(method, Method::Put | Method::Post | Method::Patch) {
            let mut buf = String::new();
            let _ = request.as_reader().read_to_string(&mut buf);
            Some(buf)
        } else {
            None
        };

        let result = dispatch(&client, config, &method, &url, body.as_deref());

        match result {
            Ok(resp) => {
                let _ = request.respond(resp);
            }
            Err(e) => {
                let body = serde_json::json!({ "error": e.to_string() }).to_string();
                let resp = Response::from_data(body.into_bytes())
                    .with_header(content_type_json())
                    .with_status_code(StatusCode(500));
                let _ = request.respond(resp);
            }
        }

        println!(
            "{} {} {}",
            method,
            url,
            chrono::Local::now().format("%H:%M:%S")
        );
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Dispatch an incoming request to the appropriate handler.
fn dispatch(
    client: &ApiClient,
    config: &TraindashConfig,
    method: &Method,
    url: &str,
    body: Option<&str>,
) -> Result<Response<Cursor<Vec<u8>>>> {
    // Strip query string for path matching
    let path = url.split('?').next().unwrap_or(url);

    match (method, path) {
        // Frontend
        (&Method::Get, "/") | (&Method::Get, "/index.html") => Ok(serve_frontend()),

        // API — dashboard data
        (&Method::Get, "/api/stats") => api::get_stats(client, config, url),
        (&Method::Get, "/api/monthly") => api::get_monthly(client, url),
        (&Method::Get, "/api/users") => api::get_users(client),
        (&Method::Get, "/api/upcoming") => api::get_upcoming(client, config, url),
        (&Method::Get, "/api/tasks") => api::get_tasks(client, url),
        (&Method::Get, "/api/snapshot") => api::get_snapshot(client, config, url),

        // API — actions
        (&Method::Post, "/api/reports") => api::post_report(client, body.unwrap_or("{}")),
        (&Method::Post, "/api/complete") => api::post_complete(client, body.unwrap_or("{}")),

        // API — health
        (&Method::Get, "/api/health") => api::get_health(client, config),

        // 404
        _ => Ok(not_found()),
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// Serve the embedded single-page frontend.
fn serve_frontend() -> Response<Cursor<Vec<u8>>> {
    Response::from_data(frontend::INDEX_HTML.as_bytes().to_vec())
        .with_header(content_type_html())
        .with_status_code(StatusCode(200))
}

/// 404 response.
fn not_found() -> Response<Cursor<Vec<u8>>> {
    let body = r#"{"error": "not found"}"#;
    Response::from_data(body.as_bytes().to_vec())
        .with_header(content_type_json())
        .with_status_code(StatusCode(404))
}

/// JSON content type header.
pub(crate) fn content_type_json() -> Header {
    Header::from_bytes("Content-Type", "application/json; charset=utf-8").unwrap()
}

/// HTML content type header.
fn content_type_html() -> Header {
    Header::from_bytes("Content-Type", "text/html; charset=utf-8").unwrap()
}
