/// Wire-level plumbing for the two request encodings the backend accepts.
///
/// The backend is a single spreadsheet-script URL that can be driven two
/// ways:
///
/// - **Primary**: POST a JSON body `{action, ...params}` and read back the
///   `{success, data?, error?}` envelope.
/// - **Fallback**: GET with everything in the query string — a unique
///   `callback` correlation name, the `action`, and each parameter
///   individually serialized (objects as JSON). The server may answer with
///   plain JSON or with the callback-invocation padding
///   `<callback>({...});`; both are accepted here.
///
/// The fallback exists because some school-network proxies strip POST
/// bodies to the script host; anything the primary can do, the fallback
/// can too.
use std::error::Error as _;
use std::net::ToSocketAddrs;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{Map, Value};

use super::error::ApiError;
use crate::util;

// ---------------------------------------------------------------------------
// Response envelope
// ---------------------------------------------------------------------------

/// The structured reply both transports produce.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Turn an envelope into the caller's result: the data payload on
/// success, a server error (with the provided or a generic message)
/// otherwise.
pub fn resolve_envelope(envelope: Envelope) -> Result<Value, ApiError> {
    if envelope.success {
        Ok(envelope.data.unwrap_or(Value::Null))
    } else {
        Err(ApiError::server(
            envelope
                .error
                .unwrap_or_else(|| "Unknown error occurred".to_string()),
        ))
    }
}

// ---------------------------------------------------------------------------
// Correlation names
// ---------------------------------------------------------------------------

/// A per-call correlation name for the fallback transport: time-based with
/// a unique suffix, so concurrent in-flight calls never collide.
pub fn correlation_name() -> String {
    format!("cb_{}_{}", util::epoch_millis(), util::unique_suffix())
}

// ---------------------------------------------------------------------------
// Reachability
// ---------------------------------------------------------------------------

/// Cheap pre-flight reachability check: can the endpoint host be resolved
/// at all? Fails fast when the machine has no usable network, without
/// issuing a request.
pub fn endpoint_reachable(endpoint: &str) -> bool {
    match host_and_port(endpoint) {
        Some((host, port)) => (host.as_str(), port).to_socket_addrs().is_ok(),
        None => false,
    }
}

fn host_and_port(endpoint: &str) -> Option<(String, u16)> {
    let rest = endpoint
        .strip_prefix("https://")
        .map(|r| (r, 443))
        .or_else(|| endpoint.strip_prefix("http://").map(|r| (r, 80)))?;
    let (rest, default_port) = rest;
    let authority = rest.split(['/', '?']).next()?;
    if authority.is_empty() {
        return None;
    }
    match authority.rsplit_once(':') {
        Some((host, port)) => Some((host.to_string(), port.parse().ok()?)),
        None => Some((authority.to_string(), default_port)),
    }
}

// ---------------------------------------------------------------------------
// Transports
// ---------------------------------------------------------------------------

/// Primary transport: POST the action and parameters as one JSON body.
pub fn primary_call(
    endpoint: &str,
    timeout: Duration,
    action: &str,
    params: &Map<String, Value>,
) -> Result<Envelope, ApiError> {
    let mut body = Map::new();
    body.insert("action".to_string(), Value::String(action.to_string()));
    for (key, value) in params {
        if !value.is_null() {
            body.insert(key.clone(), value.clone());
        }
    }

    let response = ureq::post(endpoint)
        .timeout(timeout)
        .send_json(Value::Object(body))
        .map_err(classify_transport_error)?;

    response
        .into_json::<Envelope>()
        .map_err(|e| ApiError::transport(format!("invalid response body: {e}")))
}

/// Fallback transport: everything in the query string, with a unique
/// correlation name the server may echo as callback-invocation padding.
pub fn fallback_call(
    endpoint: &str,
    timeout: Duration,
    action: &str,
    params: &Map<String, Value>,
) -> Result<Envelope, ApiError> {
    let callback = correlation_name();

    let mut request = ureq::get(endpoint)
        .timeout(timeout)
        .query("callback", &callback)
        .query("action", action);
    for (key, value) in params {
        if !value.is_null() {
            request = request.query(key, &encode_param(value));
        }
    }

    let response = request.call().map_err(classify_transport_error)?;
    let body = response
        .into_string()
        .map_err(|e| ApiError::transport(format!("failed to read response: {e}")))?;

    parse_response_body(&body, &callback)
}

/// Serialize one query-string parameter: strings verbatim, everything
/// else (numbers, booleans, objects, arrays) as JSON text.
pub fn encode_param(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Parse a fallback-transport reply, stripping the `<callback>(...)`
/// padding when the server wrapped the envelope in it.
pub fn parse_response_body(body: &str, callback: &str) -> Result<Envelope, ApiError> {
    let payload = strip_callback_padding(body, callback).unwrap_or_else(|| body.trim());
    serde_json::from_str(payload)
        .map_err(|e| ApiError::transport(format!("invalid response body: {e}")))
}

fn strip_callback_padding<'a>(body: &'a str, callback: &str) -> Option<&'a str> {
    let rest = body.trim().strip_prefix(callback)?.trim_start();
    let rest = rest.strip_prefix('(')?;
    let rest = rest.trim_end().trim_end_matches(';').trim_end();
    rest.strip_suffix(')').map(str::trim)
}

// ---------------------------------------------------------------------------
// Error classification
// ---------------------------------------------------------------------------

/// Map a ureq failure onto the typed taxonomy. Read/connect deadline
/// overruns become `Timeout`; everything else (refused connections, DNS,
/// non-2xx statuses) is `Transport`.
pub(crate) fn classify_transport_error(err: ureq::Error) -> ApiError {
    match err {
        ureq::Error::Status(code, _) => {
            ApiError::transport(format!("server returned HTTP {code}"))
        }
        ureq::Error::Transport(transport) => {
            let timed_out = transport
                .source()
                .and_then(|source| source.downcast_ref::<std::io::Error>())
                .is_some_and(|io| {
                    matches!(
                        io.kind(),
                        std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
                    )
                });
            if timed_out {
                ApiError::timeout()
            } else {
                ApiError::transport(transport.to_string())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use serde_json::json;

    use super::*;

    #[test]
    fn resolve_success_yields_data() {
        let envelope = Envelope {
            success: true,
            data: Some(json!({"totalTasks": 3})),
            error: None,
        };
        assert_eq!(resolve_envelope(envelope).unwrap()["totalTasks"], 3);
    }

    #[test]
    fn resolve_failure_carries_server_message() {
        let envelope = Envelope {
            success: false,
            data: None,
            error: Some("sheet not found".to_string()),
        };
        let err = resolve_envelope(envelope).unwrap_err();
        assert_eq!(err.kind, crate::api::ErrorKind::Server);
        assert_eq!(err.message, "sheet not found");
    }

    #[test]
    fn resolve_failure_without_message_is_generic() {
        let err = resolve_envelope(Envelope::default()).unwrap_err();
        assert_eq!(err.message, "Unknown error occurred");
    }

    #[test]
    fn correlation_names_are_pairwise_distinct() {
        let names: HashSet<String> = (0..500).map(|_| correlation_name()).collect();
        assert_eq!(names.len(), 500);
    }

    #[test]
    fn padding_is_stripped() {
        let body = r#"cb_1({"success":true,"data":[]});"#;
        let envelope = parse_response_body(body, "cb_1").unwrap();
        assert!(envelope.success);
    }

    #[test]
    fn padding_without_semicolon_is_stripped() {
        let body = "cb_9 ( {\"success\":true} )";
        assert!(parse_response_body(body, "cb_9").unwrap().success);
    }

    #[test]
    fn plain_json_body_is_accepted() {
        let body = r#"{"success":false,"error":"nope"}"#;
        let envelope = parse_response_body(body, "cb_unused").unwrap();
        assert!(!envelope.success);
    }

    #[test]
    fn unparseable_body_is_a_transport_error() {
        let err = parse_response_body("<html>proxy login</html>", "cb").unwrap_err();
        assert_eq!(err.kind, crate::api::ErrorKind::Transport);
    }

    #[test]
    fn params_encode_strings_verbatim_and_objects_as_json() {
        assert_eq!(encode_param(&json!("somchai")), "somchai");
        assert_eq!(encode_param(&json!(7)), "7");
        assert_eq!(encode_param(&json!({"year": 2567})), r#"{"year":2567}"#);
    }

    #[test]
    fn host_extraction() {
        assert_eq!(
            host_and_port("https://script.google.com/macros/s/X/exec"),
            Some(("script.google.com".to_string(), 443))
        );
        assert_eq!(
            host_and_port("http://127.0.0.1:9090/exec?x=1"),
            Some(("127.0.0.1".to_string(), 9090))
        );
        assert_eq!(host_and_port("not a url"), None);
    }
}
