//! The paginated task table.
//!
//! Visible rows are a pure function of (task list, search term,
//! pagination): the free-text search is the only filter applied locally —
//! year/assignee/month/status were already applied by the backend.

use colored::Colorize;

use crate::model::Task;
use crate::state::DashboardState;
use crate::util::{format_number, format_thai_date, truncate};

/// Maximum page buttons shown in the pagination bar.
const MAX_VISIBLE_PAGES: usize = 5;

// ---------------------------------------------------------------------------
// Filtering and slicing
// ---------------------------------------------------------------------------

/// Case-insensitive substring filter over task name and assignee name.
pub fn search_filter<'a>(tasks: &'a [Task], search: Option<&str>) -> Vec<&'a Task> {
    match search {
        None => tasks.iter().collect(),
        Some(term) => {
            let needle = term.to_lowercase();
            tasks
                .iter()
                .filter(|task| {
                    task.name.to_lowercase().contains(&needle)
                        || task.assignee.to_lowercase().contains(&needle)
                })
                .collect()
        }
    }
}

// ---------------------------------------------------------------------------
// Pagination window
// ---------------------------------------------------------------------------

/// One element of the pagination bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(usize),
    Current(usize),
    Ellipsis,
}

/// The page-button window: at most five numbered buttons centered on the
/// current page and clamped to the valid range, with first/last shortcuts
/// and ellipses when the window does not reach an edge.
pub fn page_window(current: usize, total: usize) -> Vec<PageItem> {
    if total <= 1 {
        return Vec::new();
    }

    let mut start = current.saturating_sub(MAX_VISIBLE_PAGES / 2).max(1);
    let end = (start + MAX_VISIBLE_PAGES - 1).min(total);
    if end - start + 1 < MAX_VISIBLE_PAGES {
        start = end.saturating_sub(MAX_VISIBLE_PAGES - 1).max(1);
    }

    let mut items = Vec::new();
    if start > 1 {
        items.push(PageItem::Page(1));
        if start > 2 {
            items.push(PageItem::Ellipsis);
        }
    }
    for page in start..=end {
        if page == current {
            items.push(PageItem::Current(page));
        } else {
            items.push(PageItem::Page(page));
        }
    }
    if end < total {
        if end < total - 1 {
            items.push(PageItem::Ellipsis);
        }
        items.push(PageItem::Page(total));
    }

    items
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// The full task-table section: header, rows for the current page, the
/// showing-X-of-Y line, and the pagination bar.
pub fn tasks_table(state: &DashboardState) -> String {
    let filtered = search_filter(&state.snapshot.tasks, state.filters.search_term());
    let (start, end) = state.pagination.page_bounds(filtered.len());
    let total_pages = state.pagination.total_pages(filtered.len());

    let mut out = String::new();
    out.push_str(&format!(
        "{} {}\n",
        "Training Tasks".bold().cyan(),
        format!("({} items)", format_number(filtered.len() as u64)).dimmed()
    ));

    if filtered.is_empty() {
        out.push_str(&format!("  {}\n", "no tasks match".dimmed()));
        return out;
    }

    out.push_str(&format!(
        "  {:<30} {:<18} {:<22} Status\n",
        "Task", "Assignee", "Due"
    ));
    out.push_str(&format!("  {}\n", "-".repeat(78)));

    for task in &filtered[start..end] {
        let status = if task.completed.is_completed() {
            "done".green()
        } else {
            "pending".yellow()
        };
        let link_mark = if task.link.is_empty() { " " } else { "↗" };
        out.push_str(&format!(
            "  {:<30} {:<18} {:<22} {} {}\n",
            truncate(&task.name, 30),
            truncate(&task.assignee, 18),
            format_thai_date(&task.due_date),
            status,
            link_mark.dimmed(),
        ));
    }

    out.push_str(&format!(
        "  {}\n",
        format!(
            "showing {}-{} of {}",
            start + 1,
            end,
            format_number(filtered.len() as u64)
        )
        .dimmed()
    ));

    if total_pages > 1 {
        out.push_str(&format!(
            "  {}\n",
            pagination_bar(state.pagination.current_page(), total_pages)
        ));
    }

    out
}

/// Render the page-button window as a one-line bar.
pub fn pagination_bar(current: usize, total: usize) -> String {
    let mut parts = Vec::new();
    parts.push(if current > 1 {
        "‹".normal().to_string()
    } else {
        "‹".dimmed().to_string()
    });

    for item in page_window(current, total) {
        parts.push(match item {
            PageItem::Current(page) => format!("[{page}]").bold().cyan().to_string(),
            PageItem::Page(page) => page.to_string(),
            PageItem::Ellipsis => "…".dimmed().to_string(),
        });
    }

    parts.push(if current < total {
        "›".normal().to_string()
    } else {
        "›".dimmed().to_string()
    });

    parts.join(" ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FilterSet;

    fn task(name: &str, assignee: &str) -> Task {
        Task {
            name: name.to_string(),
            assignee: assignee.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn search_matches_name_and_assignee_case_insensitively() {
        let tasks = vec![
            task("อบรม Google Workspace", "Somchai"),
            task("อบรมวัดผล", "Suda"),
            task("STEM workshop", "SOMCHAI"),
        ];
        assert_eq!(search_filter(&tasks, Some("somchai")).len(), 2);
        assert_eq!(search_filter(&tasks, Some("google")).len(), 1);
        assert_eq!(search_filter(&tasks, Some("xyz")).len(), 0);
        assert_eq!(search_filter(&tasks, None).len(), 3);
    }

    #[test]
    fn window_is_empty_for_single_page() {
        assert!(page_window(1, 1).is_empty());
        assert!(page_window(1, 0).is_empty());
    }

    #[test]
    fn window_shows_all_pages_when_few() {
        assert_eq!(
            page_window(2, 3),
            vec![
                PageItem::Page(1),
                PageItem::Current(2),
                PageItem::Page(3),
            ]
        );
    }

    #[test]
    fn window_centers_on_current_with_edge_shortcuts() {
        assert_eq!(
            page_window(6, 12),
            vec![
                PageItem::Page(1),
                PageItem::Ellipsis,
                PageItem::Page(4),
                PageItem::Page(5),
                PageItem::Current(6),
                PageItem::Page(7),
                PageItem::Page(8),
                PageItem::Ellipsis,
                PageItem::Page(12),
            ]
        );
    }

    #[test]
    fn window_clamps_at_the_edges() {
        assert_eq!(
            page_window(1, 12),
            vec![
                PageItem::Current(1),
                PageItem::Page(2),
                PageItem::Page(3),
                PageItem::Page(4),
                PageItem::Page(5),
                PageItem::Ellipsis,
                PageItem::Page(12),
            ]
        );
        assert_eq!(
            page_window(12, 12),
            vec![
                PageItem::Page(1),
                PageItem::Ellipsis,
                PageItem::Page(8),
                PageItem::Page(9),
                PageItem::Page(10),
                PageItem::Page(11),
                PageItem::Current(12),
            ]
        );
    }

    #[test]
    fn window_skips_ellipsis_when_adjacent_to_edge() {
        // start == 2: the first-page shortcut appears without an ellipsis
        assert_eq!(
            page_window(4, 6),
            vec![
                PageItem::Page(1),
                PageItem::Page(2),
                PageItem::Page(3),
                PageItem::Current(4),
                PageItem::Page(5),
                PageItem::Page(6),
            ]
        );
    }

    #[test]
    fn table_renders_current_page_rows() {
        colored::control::set_override(false);
        let mut state = crate::state::DashboardState::new(10);
        state.snapshot.tasks = (1..=23).map(|i| task(&format!("งานที่ {i}"), "ครู")).collect();
        state.pagination.go_to(3, 23);

        let out = tasks_table(&state);
        assert!(out.contains("งานที่ 21"));
        assert!(out.contains("งานที่ 23"));
        assert!(!out.contains("งานที่ 20 "));
        assert!(out.contains("showing 21-23 of 23"));
    }

    #[test]
    fn table_applies_search_before_pagination() {
        colored::control::set_override(false);
        let mut state = crate::state::DashboardState::new(10);
        state.snapshot.tasks = (1..=23)
            .map(|i| {
                task(
                    &format!("งานที่ {i}"),
                    if i <= 2 { "Somchai" } else { "Suda" },
                )
            })
            .collect();
        state.apply_filters(FilterSet {
            search: Some("SOMCHAI".to_string()),
            ..Default::default()
        });

        let out = tasks_table(&state);
        assert!(out.contains("(2 items)"));
        assert!(out.contains("showing 1-2 of 2"));
    }

    #[test]
    fn empty_table_has_placeholder() {
        colored::control::set_override(false);
        let state = crate::state::DashboardState::new(10);
        assert!(tasks_table(&state).contains("no tasks match"));
    }
}
