//! Terminal rendering of the dashboard sections.
//!
//! Every section is a pure function of the state (or a slice of it)
//! returning the finished text, so the sections can be asserted against
//! synthetic snapshots. The CLI just prints the results. Rendering twice
//! from the same state produces the same text — refresh races only ever
//! cost a repaint.

pub mod table;

use colored::Colorize;

use crate::model::{MonthlyPayload, StatsPayload, UpcomingTask, UserStat};
use crate::util::{format_number, format_thai_date, truncate};

/// Bar width used by the progress and month bars.
const BAR_WIDTH: usize = 24;

// ---------------------------------------------------------------------------
// Stat cards
// ---------------------------------------------------------------------------

/// The six stat cards plus the overall completion-rate bar.
pub fn stats_cards(stats: &StatsPayload) -> String {
    let summary = &stats.summary;
    let mut out = String::new();

    out.push_str(&format!(
        "{}\n{}\n",
        format!(
            "Training Dashboard — {}/{}",
            stats.current_month, stats.current_year
        )
        .bold()
        .cyan(),
        "=".repeat(60)
    ));

    let cards: [(&str, u64); 6] = [
        ("Total tasks", summary.total_tasks),
        ("Completed", summary.completed_tasks),
        ("Pending", summary.pending_tasks),
        ("This year", summary.current_year_tasks),
        ("This month", summary.current_month_tasks),
        ("Due soon", summary.upcoming_tasks),
    ];
    for (label, value) in cards {
        out.push_str(&format!(
            "  {} {:>10}\n",
            format!("{label:<12}").bold(),
            format_number(value)
        ));
    }

    if summary.total_tasks > 0 {
        out.push_str(&format!(
            "  {} {} {}%\n",
            format!("{:<12}", "Completion").bold(),
            progress_bar(summary.completion_rate),
            summary.completion_rate
        ));
    }

    out
}

// ---------------------------------------------------------------------------
// Monthly series
// ---------------------------------------------------------------------------

/// One bar row per month: completed portion bright, pending portion dim.
pub fn monthly_series(monthly: &MonthlyPayload) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}\n",
        format!("Monthly Breakdown — {}", monthly.target_year)
            .bold()
            .cyan()
    ));

    let max_total = monthly
        .monthly_data
        .iter()
        .map(|bucket| bucket.total)
        .max()
        .unwrap_or(0)
        .max(1);

    for bucket in &monthly.monthly_data {
        let completed_cells =
            (bucket.completed as f64 / max_total as f64 * BAR_WIDTH as f64).round() as usize;
        let total_cells =
            (bucket.total as f64 / max_total as f64 * BAR_WIDTH as f64).round() as usize;
        let pending_cells = total_cells.saturating_sub(completed_cells);

        out.push_str(&format!(
            "  {:<12} {}{}{} {}/{}\n",
            bucket.month,
            "█".repeat(completed_cells).green(),
            "█".repeat(pending_cells).yellow(),
            "░".repeat(BAR_WIDTH.saturating_sub(total_cells)).dimmed(),
            bucket.completed,
            bucket.total,
        ));
    }

    out
}

// ---------------------------------------------------------------------------
// Staff ranking
// ---------------------------------------------------------------------------

/// Top five assignees by task count, with their completion rates.
pub fn top_users(user_stats: &[UserStat]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", "Top Staff".bold().cyan()));

    if user_stats.is_empty() {
        out.push_str(&format!("  {}\n", "no per-user statistics yet".dimmed()));
        return out;
    }

    let rank_marks = ["🥇", "🥈", "🥉", " 4", " 5"];
    for (index, user) in user_stats.iter().take(5).enumerate() {
        let email = if user.email.is_empty() {
            String::new()
        } else {
            format!("  {}", user.email.dimmed())
        };
        out.push_str(&format!(
            "  {} {:<20} {:>5} tasks  {} {}%{}\n",
            rank_marks.get(index).unwrap_or(&"  "),
            truncate(&user.assignee, 20),
            format_number(user.total_tasks),
            progress_bar(user.completion_rate),
            user.completion_rate,
            email,
        ));
    }

    out
}

// ---------------------------------------------------------------------------
// Upcoming tasks
// ---------------------------------------------------------------------------

/// The next deadlines (at most ten), most urgent first by server order.
pub fn upcoming_tasks(tasks: &[UpcomingTask]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", "Upcoming Deadlines".bold().cyan()));

    if tasks.is_empty() {
        out.push_str(&format!("  {}\n", "nothing due in this window".dimmed()));
        return out;
    }

    for task in tasks.iter().take(10) {
        let due = match task.days_until_due {
            d if d < 0 => format!("{} days overdue", -d).red().to_string(),
            0 => "due today".red().bold().to_string(),
            d @ 1..=3 => format!("in {d} days").yellow().to_string(),
            d => format!("in {d} days").normal().to_string(),
        };
        out.push_str(&format!(
            "  {:<28} {:<18} {}  {}\n",
            truncate(&task.name, 28),
            truncate(&task.assignee, 18),
            due,
            format_thai_date(&task.due_date).dimmed(),
        ));
    }

    out
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// A fixed-width completion bar for a 0–100 percentage.
fn progress_bar(pct: f64) -> String {
    let filled = ((pct / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!(
        "{}{}",
        "█".repeat(filled).green(),
        "░".repeat(BAR_WIDTH - filled).dimmed()
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MonthBucket, Summary};

    #[test]
    fn fallback_stats_render_zero_everywhere() {
        colored::control::set_override(false);
        let out = stats_cards(&StatsPayload::fallback());
        for label in ["Total tasks", "Completed", "Pending", "Due soon"] {
            assert!(out.contains(label), "missing card {label}");
        }
        // Six zero-valued cards, no completion bar.
        assert_eq!(out.matches(" 0\n").count(), 6);
        assert!(!out.contains("Completion"));
    }

    #[test]
    fn completion_bar_appears_with_data() {
        colored::control::set_override(false);
        let stats = StatsPayload {
            summary: Summary {
                total_tasks: 10,
                completed_tasks: 8,
                completion_rate: 80.0,
                ..Default::default()
            },
            current_year: 2567,
            current_month: 6,
        };
        let out = stats_cards(&stats);
        assert!(out.contains("Completion"));
        assert!(out.contains("80%"));
    }

    #[test]
    fn monthly_series_renders_every_bucket() {
        colored::control::set_override(false);
        let out = monthly_series(&MonthlyPayload::fallback());
        assert_eq!(out.lines().count(), 13); // heading + 12 months
        assert!(out.contains("มกราคม"));
    }

    #[test]
    fn monthly_bar_scales_to_busiest_month() {
        colored::control::set_override(false);
        let monthly = MonthlyPayload {
            monthly_data: vec![
                MonthBucket {
                    month: "มกราคม".to_string(),
                    month_number: 1,
                    total: 10,
                    completed: 10,
                    pending: 0,
                },
                MonthBucket {
                    month: "กุมภาพันธ์".to_string(),
                    month_number: 2,
                    total: 0,
                    completed: 0,
                    pending: 0,
                },
            ],
            target_year: 2567,
        };
        let out = monthly_series(&monthly);
        assert!(out.contains(&"█".repeat(BAR_WIDTH)));
        assert!(out.contains(&"░".repeat(BAR_WIDTH)));
    }

    #[test]
    fn top_users_caps_at_five() {
        colored::control::set_override(false);
        let users: Vec<UserStat> = (0..8)
            .map(|i| UserStat {
                assignee: format!("ครู {i}"),
                total_tasks: 10 - i,
                completion_rate: 50.0,
                ..Default::default()
            })
            .collect();
        let out = top_users(&users);
        assert!(out.contains("ครู 4"));
        assert!(!out.contains("ครู 5"));
    }

    #[test]
    fn upcoming_flags_today_and_soon() {
        colored::control::set_override(false);
        let tasks = vec![
            UpcomingTask {
                name: "ส่งรายงาน".to_string(),
                days_until_due: 0,
                ..Default::default()
            },
            UpcomingTask {
                name: "อบรม STEM".to_string(),
                days_until_due: 2,
                ..Default::default()
            },
        ];
        let out = upcoming_tasks(&tasks);
        assert!(out.contains("due today"));
        assert!(out.contains("in 2 days"));
    }
}
