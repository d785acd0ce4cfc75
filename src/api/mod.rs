//! Client for the training-record backend.
//!
//! One [`ApiClient`] per process, built from config. Every remote
//! operation goes through [`ApiClient::call`]: a pre-flight reachability
//! check, the primary POST transport with a query-string fallback, and a
//! retry loop with exponential backoff around the whole thing. Failures
//! come back as a typed [`ApiError`] — exactly one of resolve-with-data
//! or fail-with-error happens per call, never both, never a hang past the
//! timeout budget.

pub mod error;
pub mod operations;
pub mod transport;

use std::thread;
use std::time::Duration;

use serde_json::{Map, Value};

pub use error::{ApiError, ErrorKind};

use crate::config::schema::ApiConfig;

/// Default per-attempt response budget.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of attempts per call.
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

/// Default first-retry delay; doubles after every failed attempt.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Synchronous client for the spreadsheet-script endpoint.
pub struct ApiClient {
    endpoint: String,
    timeout: Duration,
    retry_attempts: u32,
    retry_delay: Duration,
    callback_only: bool,
    online_probe: fn(&str) -> bool,
}

impl ApiClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: DEFAULT_TIMEOUT,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            callback_only: false,
            online_probe: transport::endpoint_reachable,
        }
    }

    /// Build a client from the resolved config.
    pub fn from_config(config: &ApiConfig) -> Self {
        Self {
            endpoint: config.endpoint_url.clone(),
            timeout: Duration::from_millis(config.timeout_ms),
            retry_attempts: config.retry_attempts.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            callback_only: config.callback_only,
            online_probe: transport::endpoint_reachable,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, attempts: u32, delay: Duration) -> Self {
        self.retry_attempts = attempts.max(1);
        self.retry_delay = delay;
        self
    }

    /// Route every request through the query-string fallback transport.
    /// The original deployment ran this way behind a body-stripping proxy.
    pub fn with_callback_only(mut self, callback_only: bool) -> Self {
        self.callback_only = callback_only;
        self
    }

    /// Replace the reachability probe. Tests use this to simulate an
    /// offline machine without touching the network stack.
    pub fn with_online_probe(mut self, probe: fn(&str) -> bool) -> Self {
        self.online_probe = probe;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Whether the endpoint currently looks reachable.
    pub fn is_online(&self) -> bool {
        (self.online_probe)(&self.endpoint)
    }

    // -- Invocation --

    /// Invoke a named remote operation and return its data payload.
    ///
    /// Retries up to the configured attempt budget with exponential
    /// backoff (`delay, delay*2, delay*4, …`); the final attempt's failure
    /// is surfaced unchanged. An offline pre-flight fails immediately —
    /// waiting out the backoff cannot restore connectivity, so the
    /// remaining budget is forfeited.
    pub fn call(&self, action: &str, params: Map<String, Value>) -> Result<Value, ApiError> {
        let mut delay = self.retry_delay;
        let mut last_error = None;

        for attempt in 1..=self.retry_attempts {
            if !(self.online_probe)(&self.endpoint) {
                return Err(ApiError::offline());
            }

            match self.dispatch(action, &params) {
                Ok(value) => return Ok(value),
                Err(err) => {
                    crate::notify::trace(&format!(
                        "{action} attempt {attempt}/{} failed: {err}",
                        self.retry_attempts
                    ));
                    last_error = Some(err);
                }
            }

            if attempt < self.retry_attempts {
                thread::sleep(delay);
                delay *= 2;
            }
        }

        Err(last_error.unwrap_or_else(|| ApiError::transport("no attempt was made")))
    }

    /// One attempt: primary transport, then the fallback if the primary
    /// failed for any reason. A server-reported failure (well-formed
    /// envelope with `success=false`) does not trigger the fallback — the
    /// server already answered.
    fn dispatch(&self, action: &str, params: &Map<String, Value>) -> Result<Value, ApiError> {
        if self.callback_only {
            return transport::fallback_call(&self.endpoint, self.timeout, action, params)
                .and_then(transport::resolve_envelope);
        }

        match transport::primary_call(&self.endpoint, self.timeout, action, params) {
            Ok(envelope) => transport::resolve_envelope(envelope),
            Err(_) => transport::fallback_call(&self.endpoint, self.timeout, action, params)
                .and_then(transport::resolve_envelope),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_applies_overrides() {
        let client = ApiClient::new("http://127.0.0.1:1/exec")
            .with_retry(5, Duration::from_millis(20))
            .with_timeout(Duration::from_secs(2))
            .with_callback_only(true);
        assert_eq!(client.retry_attempts, 5);
        assert_eq!(client.retry_delay, Duration::from_millis(20));
        assert_eq!(client.timeout, Duration::from_secs(2));
        assert!(client.callback_only);
    }

    #[test]
    fn retry_attempts_floor_at_one() {
        let client = ApiClient::new("http://x/exec").with_retry(0, Duration::ZERO);
        assert_eq!(client.retry_attempts, 1);
    }

    #[test]
    fn offline_probe_fails_without_transport() {
        let client = ApiClient::new("http://127.0.0.1:1/exec")
            .with_online_probe(|_| false)
            .with_retry(3, Duration::ZERO);
        let err = client.call("getUserStatistics", Map::new()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Offline);
    }
}
