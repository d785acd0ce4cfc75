/// Configuration schema and defaults.
///
/// Defines the TOML-serializable structure with all sections: `[api]`,
/// `[dashboard]`, and `[web]`. Every field has a built-in default; users
/// only set the values they want to override — usually just the endpoint
/// URL of the deployed spreadsheet script.
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level configuration, mapping to `~/.traindash/config.toml` and
/// `.traindash.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TraindashConfig {
    pub api: ApiConfig,
    pub dashboard: DashboardConfig,
    pub web: WebConfig,
}

// ---------------------------------------------------------------------------
// [api]
// ---------------------------------------------------------------------------

/// Remote endpoint and transport policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Deployed script URL, e.g.
    /// `https://script.google.com/macros/s/<deployment-id>/exec`.
    pub endpoint_url: String,
    /// Per-attempt response budget in milliseconds.
    pub timeout_ms: u64,
    /// Attempts per call (first try included).
    pub retry_attempts: u32,
    /// First-retry delay in milliseconds; doubles per retry.
    pub retry_delay_ms: u64,
    /// Route every request through the query-string transport. Needed
    /// behind proxies that strip POST bodies to the script host.
    pub callback_only: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint_url: String::new(),
            timeout_ms: 30_000,
            retry_attempts: 3,
            retry_delay_ms: 1_000,
            callback_only: false,
        }
    }
}

// ---------------------------------------------------------------------------
// [dashboard]
// ---------------------------------------------------------------------------

/// Dashboard behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Watch-mode refresh interval in seconds.
    pub refresh_interval_secs: u64,
    /// Default lookahead window for upcoming tasks, in days.
    pub upcoming_days: u32,
    /// Default task-table page size.
    pub page_size: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 300,
            upcoming_days: 7,
            page_size: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// [web]
// ---------------------------------------------------------------------------

/// Embedded LAN dashboard server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Bind address for `traindash serve`.
    pub bind_addr: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:9747".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Annotated default file
// ---------------------------------------------------------------------------

impl TraindashConfig {
    /// The annotated config written by `traindash config init`.
    pub fn default_toml() -> &'static str {
        r#"# traindash configuration
# Values here override the built-in defaults; .traindash.toml in the
# working directory and TRAINDASH_* environment variables override this
# file in turn.

[api]
# Deployed spreadsheet-script URL. Required before anything can load.
endpoint_url = ""
# Per-attempt response budget (milliseconds).
timeout_ms = 30000
# Attempts per call, first try included.
retry_attempts = 3
# First-retry delay (milliseconds); doubles after every failed attempt.
retry_delay_ms = 1000
# Route every request through the query-string transport (for proxies
# that strip POST bodies).
callback_only = false

[dashboard]
# Watch-mode refresh interval (seconds).
refresh_interval_secs = 300
# Default lookahead window for upcoming tasks (days).
upcoming_days = 7
# Default task-table page size.
page_size = 10

[web]
# Bind address for `traindash serve`.
bind_addr = "127.0.0.1:9747"
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_policy() {
        let config = TraindashConfig::default();
        assert_eq!(config.api.timeout_ms, 30_000);
        assert_eq!(config.api.retry_attempts, 3);
        assert_eq!(config.api.retry_delay_ms, 1_000);
        assert!(!config.api.callback_only);
        assert_eq!(config.dashboard.refresh_interval_secs, 300);
        assert_eq!(config.dashboard.page_size, 10);
    }

    #[test]
    fn default_toml_parses_back_to_defaults() {
        let parsed: TraindashConfig = toml::from_str(TraindashConfig::default_toml()).unwrap();
        assert_eq!(parsed.api.timeout_ms, TraindashConfig::default().api.timeout_ms);
        assert_eq!(parsed.web.bind_addr, "127.0.0.1:9747");
    }

    #[test]
    fn partial_toml_fills_missing_sections() {
        let parsed: TraindashConfig =
            toml::from_str("[api]\nendpoint_url = \"http://x/exec\"\n").unwrap();
        assert_eq!(parsed.api.endpoint_url, "http://x/exec");
        assert_eq!(parsed.dashboard.page_size, 10);
    }
}
