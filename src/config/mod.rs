/// Configuration system for traindash.
///
/// Layered hierarchy, later layers overriding earlier ones:
///
/// 1. **Built-in defaults** — hardcoded in [`schema`]
/// 2. **User global config** — `~/.traindash/config.toml`
/// 3. **Project local config** — `.traindash.toml` in the working directory
/// 4. **Environment variables** — `TRAINDASH_*` (highest precedence)
///
/// Malformed files are silently ignored; the dashboard must come up with
/// defaults rather than refuse to start over a typo in a TOML file.
pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::TraindashConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration: defaults → global TOML →
/// project TOML → environment variables.
pub fn load() -> TraindashConfig {
    let mut config = TraindashConfig::default();

    if let Some(global) = load_toml_file(global_config_path()) {
        merge_config(&mut config, global);
    }

    if let Some(project) = load_toml_file(project_config_path()) {
        merge_config(&mut config, project);
    }

    apply_env_overrides(&mut config);

    config
}

/// Load a TOML config file if it exists and parses.
fn load_toml_file(path: Option<PathBuf>) -> Option<TraindashConfig> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    toml::from_str(&content).ok()
}

/// Overlay a loaded layer onto the base. Each file deserializes with
/// defaults for unset keys, so replacing wholesale applies exactly the
/// values the file set.
fn merge_config(base: &mut TraindashConfig, overlay: TraindashConfig) {
    *base = overlay;
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".traindash").join("config.toml"))
}

fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".traindash.toml"))
}

/// Path to the global config file, for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Path to the project config file, for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply `TRAINDASH_*` overrides (highest precedence layer).
///
/// - `TRAINDASH_ENDPOINT_URL` — deployed script URL
/// - `TRAINDASH_TIMEOUT_MS` — per-attempt response budget
/// - `TRAINDASH_RETRY_ATTEMPTS` / `TRAINDASH_RETRY_DELAY_MS` — retry policy
/// - `TRAINDASH_CALLBACK_ONLY` — query-string transport only (`1`/`true`)
/// - `TRAINDASH_REFRESH_SECS` — watch-mode refresh interval
/// - `TRAINDASH_PAGE_SIZE` — task-table page size
/// - `TRAINDASH_BIND_ADDR` — `serve` bind address
fn apply_env_overrides(config: &mut TraindashConfig) {
    if let Ok(val) = std::env::var("TRAINDASH_ENDPOINT_URL")
        && !val.is_empty()
    {
        config.api.endpoint_url = val;
    }
    if let Ok(val) = std::env::var("TRAINDASH_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.api.timeout_ms = ms;
    }
    if let Ok(val) = std::env::var("TRAINDASH_RETRY_ATTEMPTS")
        && let Ok(attempts) = val.parse::<u32>()
    {
        config.api.retry_attempts = attempts;
    }
    if let Ok(val) = std::env::var("TRAINDASH_RETRY_DELAY_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.api.retry_delay_ms = ms;
    }
    if let Ok(val) = std::env::var("TRAINDASH_CALLBACK_ONLY") {
        config.api.callback_only = is_truthy(&val);
    }
    if let Ok(val) = std::env::var("TRAINDASH_REFRESH_SECS")
        && let Ok(secs) = val.parse::<u64>()
    {
        config.dashboard.refresh_interval_secs = secs;
    }
    if let Ok(val) = std::env::var("TRAINDASH_PAGE_SIZE")
        && let Ok(size) = val.parse::<usize>()
        && size > 0
    {
        config.dashboard.page_size = size;
    }
    if let Ok(val) = std::env::var("TRAINDASH_BIND_ADDR")
        && !val.is_empty()
    {
        config.web.bind_addr = val;
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.traindash/config.toml`.
///
/// Returns an error if the file already exists (use `force = true` to
/// overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.traindash/ directory")?;
    }

    fs::write(&path, TraindashConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key in the global config file, supporting dotted
/// keys like `api.retry_attempts`.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let toml_source = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&TraindashConfig::default())
            .context("failed to serialize default config")?
    };

    let mut value_table: toml::Value =
        toml::from_str(&toml_source).context("failed to parse config as TOML value")?;

    set_toml_value(&mut value_table, key, value)?;

    let output = toml::to_string_pretty(&value_table).context("failed to serialize config")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path, parsing the
/// new value to match the existing value's type.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.is_empty() {
        anyhow::bail!("empty config key");
    }

    let mut current = root;
    for &part in &parts[..parts.len() - 1] {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let leaf = parts[parts.len() - 1];
    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    let new_value = match table.get(leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::Float(_)) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected float for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        _ => toml::Value::String(raw_value.to_string()),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_truthy_accepts_variants() {
        assert!(is_truthy("1"));
        assert!(is_truthy("true"));
        assert!(is_truthy("YES"));
        assert!(is_truthy("on"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("false"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn set_toml_value_updates_string() {
        let mut root: toml::Value = toml::from_str("[api]\nendpoint_url = \"\"\n").unwrap();
        set_toml_value(&mut root, "api.endpoint_url", "http://x/exec").unwrap();
        let api = root.as_table().unwrap()["api"].as_table().unwrap();
        assert_eq!(api["endpoint_url"].as_str(), Some("http://x/exec"));
    }

    #[test]
    fn set_toml_value_updates_integer() {
        let mut root: toml::Value = toml::from_str("[api]\nretry_attempts = 3\n").unwrap();
        set_toml_value(&mut root, "api.retry_attempts", "5").unwrap();
        let api = root.as_table().unwrap()["api"].as_table().unwrap();
        assert_eq!(api["retry_attempts"].as_integer(), Some(5));
    }

    #[test]
    fn set_toml_value_updates_bool() {
        let mut root: toml::Value = toml::from_str("[api]\ncallback_only = false\n").unwrap();
        set_toml_value(&mut root, "api.callback_only", "true").unwrap();
        let api = root.as_table().unwrap()["api"].as_table().unwrap();
        assert_eq!(api["callback_only"].as_bool(), Some(true));
    }

    #[test]
    fn set_toml_value_rejects_invalid_key() {
        let mut root: toml::Value = toml::from_str("[api]\ntimeout_ms = 30000\n").unwrap();
        assert!(set_toml_value(&mut root, "nonexistent.key", "value").is_err());
    }

    #[test]
    fn show_effective_config_returns_parseable_toml() {
        let toml_str = show_effective_config().unwrap();
        let _: TraindashConfig = toml::from_str(&toml_str).unwrap();
    }
}
