//! The explicit state container the controller owns.
//!
//! Render functions receive this by reference instead of reading ambient
//! globals, so they can be unit-tested against synthetic state. Snapshot
//! installation is last-write-wins: concurrent refreshes are not
//! coordinated, and re-rendering from the latest state is idempotent.

use crate::model::{DashboardSnapshot, FilterSet};

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// 1-based pagination over the filtered task list.
///
/// Invariant: the current page stays within `[1, total_pages]` for the
/// list it is used against; navigation outside that range is a silent
/// no-op, and filter or page-size changes reset to page 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationState {
    current_page: usize,
    page_size: usize,
}

impl PaginationState {
    pub fn new(page_size: usize) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// `ceil(filtered_count / page_size)`.
    pub fn total_pages(&self, filtered_count: usize) -> usize {
        filtered_count.div_ceil(self.page_size)
    }

    /// Navigate to `page`. Out-of-range requests are ignored and `false`
    /// is returned.
    pub fn go_to(&mut self, page: usize, filtered_count: usize) -> bool {
        if page < 1 || page > self.total_pages(filtered_count) {
            return false;
        }
        self.current_page = page;
        true
    }

    /// Change the page size and reset to the first page.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.current_page = 1;
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    /// Pull the current page back into range after the filtered list
    /// shrank underneath it.
    pub fn clamp(&mut self, filtered_count: usize) {
        let total = self.total_pages(filtered_count).max(1);
        self.current_page = self.current_page.clamp(1, total);
    }

    /// Half-open index range of the visible slice.
    pub fn page_bounds(&self, filtered_count: usize) -> (usize, usize) {
        let start = (self.current_page - 1) * self.page_size;
        let start = start.min(filtered_count);
        let end = (start + self.page_size).min(filtered_count);
        (start, end)
    }
}

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

/// Everything the dashboard knows: the last-installed snapshot plus the
/// active filters and pagination.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub snapshot: DashboardSnapshot,
    pub filters: FilterSet,
    pub pagination: PaginationState,
}

impl DashboardState {
    pub fn new(page_size: usize) -> Self {
        Self {
            snapshot: DashboardSnapshot::fallback(),
            filters: FilterSet::default(),
            pagination: PaginationState::new(page_size),
        }
    }

    /// Replace the active filters and reset pagination to page 1.
    pub fn apply_filters(&mut self, filters: FilterSet) {
        self.filters = filters;
        self.pagination.reset();
    }

    /// Install a freshly loaded snapshot (last-write-wins) and keep the
    /// current page in range for the new task list.
    pub fn install_snapshot(&mut self, snapshot: DashboardSnapshot) {
        self.snapshot = snapshot;
        let visible = crate::render::table::search_filter(
            &self.snapshot.tasks,
            self.filters.search_term(),
        )
        .len();
        self.pagination.clamp(visible);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Task;

    fn tasks(n: usize) -> Vec<Task> {
        (0..n)
            .map(|i| Task {
                id: i.to_string(),
                name: format!("task {i}"),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn total_pages_matches_ceiling_division() {
        let pagination = PaginationState::new(10);
        assert_eq!(pagination.total_pages(0), 0);
        assert_eq!(pagination.total_pages(1), 1);
        assert_eq!(pagination.total_pages(10), 1);
        assert_eq!(pagination.total_pages(11), 2);
        assert_eq!(pagination.total_pages(23), 3);
    }

    #[test]
    fn ceiling_property_holds_for_sweep() {
        for page_size in 1..=7 {
            let pagination = PaginationState::new(page_size);
            for count in 0..50 {
                let expected = (count + page_size - 1) / page_size;
                assert_eq!(pagination.total_pages(count), expected);
            }
        }
    }

    #[test]
    fn go_to_out_of_range_is_a_no_op() {
        let mut pagination = PaginationState::new(10);
        assert!(!pagination.go_to(0, 23));
        assert!(!pagination.go_to(5, 23));
        assert_eq!(pagination.current_page(), 1);
        assert!(pagination.go_to(3, 23));
        assert_eq!(pagination.current_page(), 3);
    }

    #[test]
    fn page_size_change_resets_to_first_page() {
        let mut pagination = PaginationState::new(10);
        pagination.go_to(3, 30);
        pagination.set_page_size(25);
        assert_eq!(pagination.current_page(), 1);
        assert_eq!(pagination.page_size(), 25);
    }

    #[test]
    fn page_bounds_clip_the_last_page() {
        let mut pagination = PaginationState::new(10);
        pagination.go_to(3, 23);
        assert_eq!(pagination.page_bounds(23), (20, 23));
    }

    #[test]
    fn apply_filters_resets_pagination() {
        let mut state = DashboardState::new(10);
        state.snapshot.tasks = tasks(30);
        state.pagination.go_to(3, 30);
        state.apply_filters(FilterSet {
            search: Some("task 1".to_string()),
            ..Default::default()
        });
        assert_eq!(state.pagination.current_page(), 1);
    }

    #[test]
    fn install_snapshot_clamps_current_page() {
        let mut state = DashboardState::new(10);
        state.snapshot.tasks = tasks(30);
        state.pagination.go_to(3, 30);

        let mut smaller = DashboardSnapshot::fallback();
        smaller.tasks = tasks(5);
        state.install_snapshot(smaller);
        assert_eq!(state.pagination.current_page(), 1);
    }
}
