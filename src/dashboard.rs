//! Dashboard load/refresh orchestration.
//!
//! A full load fires the four aggregate fetches concurrently, each
//! insulated: whichever branches fail fall back to their default values
//! (zero stats, zero-filled months, empty lists) without cancelling the
//! rest. Once all four have settled, the filtered task list is fetched
//! sequentially. There is no error state — a total failure still leaves a
//! well-defined snapshot, and the dashboard renders zeros.

use std::thread;

use crate::api::{ApiClient, ApiError};
use crate::model::{DashboardSnapshot, FilterSet, MonthlyPayload, StatsPayload};
use crate::notify;

/// Parameters of a full load.
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    /// Lookahead window for the upcoming-task fetches, in days.
    pub upcoming_days: u32,
    /// Monthly-series year; `None` means the backend's current year.
    pub year: Option<i32>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            upcoming_days: 7,
            year: None,
        }
    }
}

/// What happened during a refresh, for the controller's notifications.
#[derive(Debug)]
pub struct LoadOutcome {
    /// Aggregate branches that fell back to defaults.
    pub failed_branches: Vec<(&'static str, ApiError)>,
    /// Result of the sequential task-list fetch.
    pub task_fetch: Result<(), ApiError>,
}

impl LoadOutcome {
    pub fn fully_loaded(&self) -> bool {
        self.failed_branches.is_empty() && self.task_fetch.is_ok()
    }
}

/// Load the four dashboard aggregates concurrently, one thread per fetch.
///
/// Completion order is irrelevant: the snapshot is assembled only after
/// every branch has settled, and each failed branch is replaced by its
/// default. The task list starts empty — [`load_full`] fills it.
pub fn load_snapshot(
    client: &ApiClient,
    options: &LoadOptions,
) -> (DashboardSnapshot, Vec<(&'static str, ApiError)>) {
    let (stats, monthly, users, upcoming) = thread::scope(|scope| {
        let stats = scope.spawn(|| client.dashboard_stats(options.upcoming_days));
        let monthly = scope.spawn(|| client.monthly_stats(options.year));
        let users = scope.spawn(|| client.user_statistics());
        let upcoming = scope.spawn(|| client.upcoming_tasks(options.upcoming_days));
        (
            settle(stats),
            settle(monthly),
            settle(users),
            settle(upcoming),
        )
    });

    let mut failed = Vec::new();

    let stats = stats.unwrap_or_else(|err| {
        failed.push(("summary statistics", err));
        StatsPayload::fallback()
    });
    let monthly = monthly.unwrap_or_else(|err| {
        failed.push(("monthly breakdown", err));
        MonthlyPayload::fallback()
    });
    let user_stats = users.unwrap_or_else(|err| {
        failed.push(("per-user statistics", err));
        Vec::new()
    });
    let upcoming = upcoming.unwrap_or_else(|err| {
        failed.push(("upcoming tasks", err));
        Vec::new()
    });

    (
        DashboardSnapshot {
            stats,
            monthly,
            user_stats,
            upcoming,
            tasks: Vec::new(),
        },
        failed,
    )
}

/// Full load: the concurrent aggregates, then the task list for the
/// given filters. Always returns a usable snapshot.
pub fn load_full(
    client: &ApiClient,
    filters: &FilterSet,
    options: &LoadOptions,
) -> (DashboardSnapshot, LoadOutcome) {
    let (mut snapshot, failed_branches) = load_snapshot(client, options);

    let task_fetch = match client.training_tasks(filters) {
        Ok(tasks) => {
            snapshot.tasks = tasks;
            Ok(())
        }
        Err(err) => Err(err),
    };

    for (branch, err) in &failed_branches {
        notify::trace(&format!("{branch} fell back to defaults: {err}"));
    }

    (
        snapshot,
        LoadOutcome {
            failed_branches,
            task_fetch,
        },
    )
}

/// Join a fetch thread, converting a panic into a transport failure so a
/// poisoned branch degrades like any other failed fetch.
fn settle<T>(
    handle: thread::ScopedJoinHandle<'_, Result<T, ApiError>>,
) -> Result<T, ApiError> {
    handle
        .join()
        .unwrap_or_else(|_| Err(ApiError::transport("fetch worker panicked")))
}
