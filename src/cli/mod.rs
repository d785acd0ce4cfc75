//! CLI command implementations.
//!
//! The controller layer: wires flags to state changes, orchestrates
//! load → render cycles, and decides which notifications the user sees.
//! Every handler surfaces errors through [`notify`] — server-reported
//! messages verbatim, connectivity problems as the generic prompt — and
//! never leaves the process wedged on a partial load.

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::api::{ApiClient, ErrorKind};
use crate::config::{self, TraindashConfig};
use crate::dashboard::{self, LoadOptions};
use crate::forms::{self, ReportForm};
use crate::model::{Completion, FilterSet};
use crate::notify;
use crate::render;
use crate::state::DashboardState;
use crate::util::Debouncer;

// ---------------------------------------------------------------------------
// Shared setup
// ---------------------------------------------------------------------------

/// Build the API client, refusing politely when no endpoint is
/// configured yet.
fn client_from(config: &TraindashConfig) -> Result<ApiClient> {
    if config.api.endpoint_url.trim().is_empty() {
        anyhow::bail!(
            "no endpoint configured — run `traindash config init` and set api.endpoint_url"
        );
    }
    Ok(ApiClient::from_config(&config.api))
}

/// Server-side filter flags shared by several subcommands.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct FilterArgs {
    /// Buddhist-era year to filter by
    #[arg(long)]
    pub year: Option<i32>,
    /// Assignee name to filter by
    #[arg(long)]
    pub assignee: Option<String>,
    /// Month number (1-12) to filter by
    #[arg(long)]
    pub month: Option<u32>,
    /// Completion status to filter by: yes / no
    #[arg(long)]
    pub status: Option<Completion>,
    /// Free-text search over task and assignee names
    #[arg(long)]
    pub search: Option<String>,
}

impl FilterArgs {
    pub fn into_filter_set(self) -> FilterSet {
        FilterSet {
            year: self.year,
            assignee: self.assignee.filter(|s| !s.trim().is_empty()),
            month: self.month,
            status: self.status,
            search: self.search.filter(|s| !s.trim().is_empty()),
        }
    }
}

// ---------------------------------------------------------------------------
// traindash dashboard
// ---------------------------------------------------------------------------

/// Full dashboard: concurrent aggregate load, then every section.
pub fn run_dashboard(days: Option<u32>, year: Option<i32>) -> Result<()> {
    let config = config::load();
    let client = client_from(&config)?;
    let mut state = DashboardState::new(config.dashboard.page_size);

    let options = LoadOptions {
        upcoming_days: days.unwrap_or(config.dashboard.upcoming_days),
        year,
    };

    notify::loading("loading dashboard data...");
    let fully_loaded = refresh_into(&client, &mut state, &options, false);

    print_dashboard(&state);

    if fully_loaded {
        notify::success("dashboard up to date");
    }
    Ok(())
}

fn print_dashboard(state: &DashboardState) {
    println!("{}", render::stats_cards(&state.snapshot.stats));
    println!("{}", render::monthly_series(&state.snapshot.monthly));
    println!("{}", render::top_users(&state.snapshot.user_stats));
    println!("{}", render::upcoming_tasks(&state.snapshot.upcoming));
    println!("{}", render::table::tasks_table(state));
}

/// Load into the state container and notify per policy. Returns whether
/// everything loaded. In background mode (watch-mode refreshes) timeouts
/// are swallowed so the user is not interrupted every five minutes.
fn refresh_into(
    client: &ApiClient,
    state: &mut DashboardState,
    options: &LoadOptions,
    background: bool,
) -> bool {
    let (snapshot, outcome) = dashboard::load_full(client, &state.filters, options);
    state.install_snapshot(snapshot);

    for (branch, err) in &outcome.failed_branches {
        if background && err.kind == ErrorKind::Timeout {
            continue;
        }
        notify::api_error(&format!("could not load {branch}"), err);
    }
    if let Err(err) = &outcome.task_fetch
        && !(background && err.kind == ErrorKind::Timeout)
    {
        notify::api_error("could not load the task list", err);
    }

    outcome.fully_loaded()
}

// ---------------------------------------------------------------------------
// traindash tasks
// ---------------------------------------------------------------------------

/// Filtered, paginated task table.
pub fn run_tasks(filters: FilterArgs, page: usize, page_size: Option<usize>) -> Result<()> {
    let config = config::load();
    let client = client_from(&config)?;
    let mut state = DashboardState::new(page_size.unwrap_or(config.dashboard.page_size));
    state.apply_filters(filters.into_filter_set());

    notify::loading("loading tasks...");
    match client.training_tasks(&state.filters) {
        Ok(tasks) => {
            let mut snapshot = state.snapshot.clone();
            snapshot.tasks = tasks;
            state.install_snapshot(snapshot);
        }
        Err(err) => {
            notify::api_error("could not load the task list", &err);
            return Ok(());
        }
    }

    // Out-of-range page requests are ignored and page 1 is shown.
    let visible = render::table::search_filter(&state.snapshot.tasks, state.filters.search_term())
        .len();
    state.pagination.go_to(page, visible);

    println!("{}", render::table::tasks_table(&state));
    Ok(())
}

// ---------------------------------------------------------------------------
// traindash report
// ---------------------------------------------------------------------------

/// Validate and submit a training report, then reload the dashboard.
pub fn run_report(form: ReportForm) -> Result<()> {
    // Local validation happens before any network traffic.
    let report = match forms::validate(&form) {
        Ok(report) => report,
        Err(err) => {
            notify::error(&err.to_string());
            return Ok(());
        }
    };

    let config = config::load();
    let client = client_from(&config)?;

    notify::loading("saving the training report...");
    match client.save_training_report(&report) {
        Ok(_) => {
            notify::success(&format!("report saved for task {}", report.task_gid));
        }
        Err(err) => {
            notify::api_error("could not save the report", &err);
            return Ok(());
        }
    }

    // Mirror the submission with fresh totals.
    let mut state = DashboardState::new(config.dashboard.page_size);
    let options = LoadOptions {
        upcoming_days: config.dashboard.upcoming_days,
        year: None,
    };
    refresh_into(&client, &mut state, &options, false);
    println!("{}", render::stats_cards(&state.snapshot.stats));
    Ok(())
}

// ---------------------------------------------------------------------------
// traindash complete
// ---------------------------------------------------------------------------

/// Mark a task complete after confirmation.
pub fn run_complete(task_id: String, assume_yes: bool) -> Result<()> {
    if !notify::confirm(&format!("mark task {task_id} as completed?"), assume_yes) {
        return Ok(());
    }

    let config = config::load();
    let client = client_from(&config)?;

    notify::loading("updating task status...");
    match client.update_task_status(&task_id, Completion::Completed) {
        Ok(()) => notify::success("task marked as completed"),
        Err(err) => notify::api_error("could not update the task status", &err),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// traindash export
// ---------------------------------------------------------------------------

/// Ask the backend for a spreadsheet export of the filtered task list.
pub fn run_export(filters: FilterArgs, output: Option<std::path::PathBuf>) -> Result<()> {
    let config = config::load();
    let client = client_from(&config)?;
    let filter_set = filters.into_filter_set();

    notify::loading("preparing the export...");
    let export = match client.export_to_excel(&filter_set) {
        Ok(export) => export,
        Err(err) => {
            notify::api_error("could not export the task list", &err);
            return Ok(());
        }
    };

    let Some(url) = export.download_url.filter(|u| !u.is_empty()) else {
        notify::success("export requested — the backend reported no file yet");
        return Ok(());
    };
    let filename = export
        .filename
        .filter(|f| !f.is_empty())
        .unwrap_or_else(|| "training_data.xlsx".to_string());

    match output {
        Some(path) => {
            download_file(&url, &path).with_context(|| format!("failed to download {url}"))?;
            notify::success(&format!("export saved to {}", path.display()));
        }
        None => {
            notify::success(&format!("export ready: {filename}"));
            println!("  {}", url.underline());
        }
    }
    Ok(())
}

fn download_file(url: &str, path: &std::path::Path) -> Result<()> {
    let response = ureq::get(url)
        .timeout(Duration::from_secs(120))
        .call()
        .context("download request failed")?;
    let mut reader = response.into_reader();
    let mut file = std::fs::File::create(path).context("failed to create output file")?;
    std::io::copy(&mut reader, &mut file).context("failed to write output file")?;
    file.flush().ok();
    Ok(())
}

// ---------------------------------------------------------------------------
// traindash sync
// ---------------------------------------------------------------------------

/// Trigger the Asana-side sync after confirmation.
pub fn run_sync(assume_yes: bool) -> Result<()> {
    if !notify::confirm(
        "sync task data from Asana? This can take a while.",
        assume_yes,
    ) {
        return Ok(());
    }

    let config = config::load();
    let client = client_from(&config)?;

    notify::loading("syncing from Asana...");
    match client.sync_from_asana() {
        Ok(outcome) => {
            notify::success(&format!(
                "sync finished — {} records updated",
                outcome.updated
            ));
        }
        Err(err) => notify::api_error("could not sync from Asana", &err),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// traindash watch
// ---------------------------------------------------------------------------

/// Auto-refreshing dashboard loop.
///
/// Repaints on the configured interval. Timeouts during background
/// refreshes are swallowed; an offline→online transition triggers an
/// immediate (debounced) refresh, like a browser reconnect handler.
pub fn run_watch(interval_secs: Option<u64>) -> Result<()> {
    let config = config::load();
    let client = client_from(&config)?;
    let interval = Duration::from_secs(
        interval_secs
            .unwrap_or(config.dashboard.refresh_interval_secs)
            .max(5),
    );
    let options = LoadOptions {
        upcoming_days: config.dashboard.upcoming_days,
        year: None,
    };

    let mut state = DashboardState::new(config.dashboard.page_size);
    let mut debounce = Debouncer::new(Duration::from_secs(5));
    let mut was_online = client.is_online();
    let mut background = false;

    println!(
        "{}",
        format!(
            "watching — refreshing every {}s, Ctrl+C to stop",
            interval.as_secs()
        )
        .dimmed()
    );

    loop {
        if debounce.ready() {
            refresh_into(&client, &mut state, &options, background);
            print_dashboard(&state);
            background = true;
        }

        // Poll connectivity while sleeping out the interval.
        let mut slept = Duration::ZERO;
        let step = Duration::from_secs(1);
        while slept < interval {
            std::thread::sleep(step.min(interval - slept));
            slept += step;

            let online = client.is_online();
            if online && !was_online {
                notify::success("connection restored — refreshing");
                was_online = online;
                break;
            }
            if !online && was_online {
                notify::network_error();
            }
            was_online = online;
        }
    }
}

// ---------------------------------------------------------------------------
// traindash health
// ---------------------------------------------------------------------------

/// Check system health: config, connectivity, backend round-trip.
pub fn run_health() -> Result<()> {
    println!("{}", "traindash Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let config = config::load();

    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.traindash/config.toml found"
        } else {
            "not found (run `traindash config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".traindash.toml found"
        } else {
            "none (optional)"
        },
    );

    let endpoint_set = !config.api.endpoint_url.trim().is_empty();
    print_health_item(
        "Endpoint",
        endpoint_set,
        if endpoint_set {
            config.api.endpoint_url.as_str()
        } else {
            "not configured"
        },
    );

    if endpoint_set {
        let client = ApiClient::from_config(&config.api);
        let online = client.is_online();
        print_health_item(
            "Network",
            online,
            if online {
                "endpoint host resolves"
            } else {
                "endpoint host unreachable"
            },
        );

        if online {
            match client.user_statistics() {
                Ok(stats) => print_health_item(
                    "Backend",
                    true,
                    &format!("answering ({} assignees on record)", stats.len()),
                ),
                Err(err) => print_health_item("Backend", false, &err.to_string()),
            }
        }
    }

    print_health_item(
        "Transport",
        true,
        if config.api.callback_only {
            "query-string only"
        } else {
            "POST with query-string fallback"
        },
    );

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<16} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// traindash config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective traindash Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");
    Ok(())
}

/// Initialize a default config file at `~/.traindash/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    notify::success(&format!("config written to {}", path.display()));
    println!(
        "  {}",
        "set api.endpoint_url to the deployed script URL.".dimmed()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    notify::success(&format!("set {} = {}", key.bold(), value));
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    notify::success(&format!("config reset to defaults at {}", path.display()));
    Ok(())
}

// ---------------------------------------------------------------------------
// traindash serve
// ---------------------------------------------------------------------------

/// Start the embedded LAN dashboard server.
pub fn run_serve(bind_addr: Option<String>) -> Result<()> {
    let config = config::load();
    let client = client_from(&config)?;
    let addr = bind_addr.unwrap_or_else(|| config.web.bind_addr.clone());
    crate::web::serve(&addr, client, &config)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_args_drop_blank_strings() {
        let args = FilterArgs {
            year: Some(2567),
            assignee: Some("  ".to_string()),
            month: None,
            status: None,
            search: Some("stem".to_string()),
        };
        let filters = args.into_filter_set();
        assert_eq!(filters.year, Some(2567));
        assert!(filters.assignee.is_none());
        assert_eq!(filters.search.as_deref(), Some("stem"));
    }

    #[test]
    fn client_requires_an_endpoint() {
        let config = TraindashConfig::default();
        assert!(client_from(&config).is_err());
    }
}
