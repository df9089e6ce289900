use std::collections::HashSet;

use crate::table::{SortDirection, Table};
use crate::text::fold_for_match;

/// Which of the two record presentations is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Form,
    Table,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Form => "form",
            ViewMode::Table => "table",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "form" => Some(ViewMode::Form),
            "table" => Some(ViewMode::Table),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Form => ViewMode::Table,
            ViewMode::Table => ViewMode::Form,
        }
    }
}

/// The active filter predicate. Kept around so the match set can be
/// recomputed after a sort permutes the rows.
#[derive(Debug, Clone)]
pub struct Filter {
    pub col: usize,
    /// User's text as typed, for the status line.
    pub raw: String,
    /// Folded needle actually matched against cells.
    needle: String,
}

/// Navigation and selection state over one Table.
///
/// `current` is always an absolute row index; when a filter is active,
/// stepping moves through `matches` but `current` still names the
/// absolute row being shown.
#[derive(Debug, Default)]
pub struct ViewState {
    current: usize,
    matches: Vec<usize>,
    match_pos: usize,
    pub mode: ViewMode,
    /// Visibility flag per column position. All-false falls back to
    /// "every column" at read time.
    visible: Vec<bool>,
    filter: Option<Filter>,
    sort: Option<(usize, SortDirection)>,
    /// Field positions currently expanded in the form view; cleared
    /// whenever the shown record changes.
    expanded: HashSet<usize>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-key state for a freshly loaded table: navigation and filter
    /// reset, the persisted header preference is intersected with the
    /// new headers by name (empty intersection means "show all").
    pub fn reset_for(&mut self, table: &Table, saved_headers: Option<&[String]>) {
        self.current = 0;
        self.matches.clear();
        self.match_pos = 0;
        self.filter = None;
        self.sort = None;
        self.expanded.clear();

        self.visible = match saved_headers {
            Some(saved) => table
                .headers()
                .iter()
                .map(|h| saved.iter().any(|s| s == h))
                .collect(),
            None => vec![true; table.col_count()],
        };
        if !self.visible.iter().any(|&v| v) {
            self.visible = vec![true; table.col_count()];
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn matches(&self) -> &[usize] {
        &self.matches
    }

    pub fn match_pos(&self) -> usize {
        self.match_pos
    }

    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    pub fn sort(&self) -> Option<(usize, SortDirection)> {
        self.sort
    }

    /// Jump to an absolute record, clamped into bounds. No-op on an
    /// empty table.
    pub fn go_to(&mut self, table: &Table, index: usize) {
        if table.is_empty() {
            return;
        }
        let clamped = index.min(table.row_count() - 1);
        if clamped != self.current {
            self.expanded.clear();
        }
        self.current = clamped;
        // keep the match pointer in step when the target is a match
        if let Some(pos) = self.matches.iter().position(|&m| m == clamped) {
            self.match_pos = pos;
        }
    }

    /// Move one record forward or back: over the match set when a
    /// filter is active, over all rows otherwise. Clamps at either end.
    pub fn step(&mut self, table: &Table, delta: i64) {
        if table.is_empty() {
            return;
        }
        if !self.matches.is_empty() {
            let pos = if delta > 0 {
                (self.match_pos + 1).min(self.matches.len() - 1)
            } else {
                self.match_pos.saturating_sub(1)
            };
            if pos != self.match_pos {
                self.expanded.clear();
            }
            self.match_pos = pos;
            self.current = self.matches[pos];
        } else {
            let target = if delta > 0 {
                self.current.saturating_add(1)
            } else {
                self.current.saturating_sub(1)
            };
            self.go_to(table, target);
        }
    }

    /// Apply a substring filter over one column. Matching is
    /// case-insensitive with whitespace collapsed on both sides.
    /// Errors leave all state untouched, including any previous filter.
    pub fn apply_filter(&mut self, table: &Table, col: usize, raw: &str) -> Result<usize, String> {
        let needle = fold_for_match(raw);
        if needle.is_empty() {
            return Err("Please enter a value to search.".to_string());
        }

        let found = Self::matching_rows(table, col, &needle);
        if found.is_empty() {
            return Err("No matching records found.".to_string());
        }

        self.matches = found;
        self.match_pos = 0;
        self.current = self.matches[0];
        self.expanded.clear();
        self.filter = Some(Filter {
            col,
            raw: raw.trim().to_string(),
            needle,
        });
        Ok(self.matches.len())
    }

    fn matching_rows(table: &Table, col: usize, needle: &str) -> Vec<usize> {
        (0..table.row_count())
            .filter(|&row| fold_for_match(table.cell(row, col)).contains(needle))
            .collect()
    }

    /// Drop the filter; the shown record stays where it is.
    pub fn clear_filter(&mut self) {
        self.matches.clear();
        self.match_pos = 0;
        self.filter = None;
    }

    /// Sort the table by a column, toggling direction on a repeat of
    /// the same column. The shown record follows its row through the
    /// permutation, and an active filter's match set is recomputed
    /// against the new order.
    pub fn sort_request(&mut self, table: &mut Table, col: usize) -> SortDirection {
        let direction = match self.sort {
            Some((prev, dir)) if prev == col => dir.flipped(),
            _ => SortDirection::Ascending,
        };
        self.sort = Some((col, direction));

        let perm = table.sort_by(col, direction);
        if let Some(new_pos) = perm.iter().position(|&old| old == self.current) {
            self.current = new_pos;
        }

        if let Some(filter) = &self.filter {
            self.matches = Self::matching_rows(table, filter.col, &filter.needle);
            self.match_pos = self
                .matches
                .iter()
                .position(|&m| m == self.current)
                .unwrap_or(0);
        }
        direction
    }

    // --- column visibility ---

    /// The columns both renderers and export should show, in header
    /// order. An empty selection falls back to every column.
    pub fn visible_cols(&self, table: &Table) -> Vec<usize> {
        let chosen: Vec<usize> = self
            .visible
            .iter()
            .enumerate()
            .filter_map(|(i, &v)| v.then_some(i))
            .collect();
        if chosen.is_empty() {
            (0..table.col_count()).collect()
        } else {
            chosen
        }
    }

    pub fn is_visible(&self, col: usize) -> bool {
        self.visible.get(col).copied().unwrap_or(false)
    }

    pub fn toggle_col(&mut self, col: usize) {
        if let Some(v) = self.visible.get_mut(col) {
            *v = !*v;
        }
    }

    pub fn set_all_visible(&mut self, on: bool) {
        for v in &mut self.visible {
            *v = on;
        }
    }

    /// Header names of the explicitly selected columns, the shape the
    /// preference file stores. Duplicate-named columns share their
    /// fate on reload; names are only the persistence format.
    pub fn visible_names(&self, table: &Table) -> Vec<String> {
        self.visible
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v)
            .filter_map(|(i, _)| table.headers().get(i).cloned())
            .collect()
    }

    // --- displayed rows ---

    /// Absolute indices of the rows the table view and export operate
    /// on: the match set when a filter is active, else every row.
    pub fn displayed_rows(&self, table: &Table) -> Vec<usize> {
        if self.matches.is_empty() {
            (0..table.row_count()).collect()
        } else {
            self.matches.clone()
        }
    }

    // --- form view expansion ---

    pub fn is_expanded(&self, col: usize) -> bool {
        self.expanded.contains(&col)
    }

    pub fn toggle_expanded(&mut self, col: usize) {
        if !self.expanded.remove(&col) {
            self.expanded.insert(col);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_rows() -> Table {
        Table::new(
            vec!["Name".into(), "Age".into()],
            vec![
                vec!["Ann".into(), "30".into()],
                vec!["Bo".into(), "41".into()],
            ],
        )
    }

    fn fresh(table: &Table) -> ViewState {
        let mut v = ViewState::new();
        v.reset_for(table, None);
        v
    }

    #[test]
    fn test_goto_clamps_high() {
        // Scenario A: goTo(5) on a two-row table clamps to index 1
        let t = two_rows();
        let mut v = fresh(&t);
        v.go_to(&t, 5);
        assert_eq!(v.current(), 1);
        assert_eq!(t.row(v.current()).unwrap(), ["Bo", "41"]);
    }

    #[test]
    fn test_goto_in_range_reads_back() {
        let t = two_rows();
        let mut v = fresh(&t);
        for i in 0..t.row_count() {
            v.go_to(&t, i);
            assert_eq!(v.current(), i);
        }
    }

    #[test]
    fn test_goto_empty_table_noop() {
        let t = Table::empty();
        let mut v = fresh(&t);
        v.go_to(&t, 3);
        assert_eq!(v.current(), 0);
    }

    #[test]
    fn test_filter_matches_row() {
        // Scenario B: filter col 1 for "41" selects row 1
        let t = two_rows();
        let mut v = fresh(&t);
        let n = v.apply_filter(&t, 1, "41").unwrap();
        assert_eq!(n, 1);
        assert_eq!(v.matches(), &[1]);
        assert_eq!(v.current(), 1);
    }

    #[test]
    fn test_filter_blank_rejected() {
        // Scenario C: whitespace-only needle is rejected, prior state kept
        let t = two_rows();
        let mut v = fresh(&t);
        v.apply_filter(&t, 1, "41").unwrap();
        assert!(v.apply_filter(&t, 0, "   ").is_err());
        assert_eq!(v.matches(), &[1]);
        assert_eq!(v.current(), 1);
    }

    #[test]
    fn test_filter_no_match_keeps_previous() {
        let t = two_rows();
        let mut v = fresh(&t);
        v.apply_filter(&t, 0, "ann").unwrap();
        assert!(v.apply_filter(&t, 0, "zzz").is_err());
        assert_eq!(v.matches(), &[0]);
    }

    #[test]
    fn test_filter_case_and_whitespace_folded() {
        let t = Table::new(
            vec!["Note".into()],
            vec![
                vec!["Hello   World".into()],
                vec!["other".into()],
                vec!["say HELLO WORLD now".into()],
            ],
        );
        let mut v = fresh(&t);
        v.apply_filter(&t, 0, "  hello world ").unwrap();
        assert_eq!(v.matches(), &[0, 2]);
    }

    #[test]
    fn test_step_visits_each_match_once() {
        let t = Table::new(
            vec!["X".into()],
            vec![
                vec!["a".into()],
                vec!["b".into()],
                vec!["a".into()],
                vec!["a".into()],
                vec!["c".into()],
            ],
        );
        let mut v = fresh(&t);
        v.apply_filter(&t, 0, "a").unwrap();

        let mut visited = vec![v.current()];
        for _ in 0..10 {
            let before = v.current();
            v.step(&t, 1);
            if v.current() != before {
                visited.push(v.current());
            }
        }
        // every matching row, ascending, exactly once, clamped at end
        assert_eq!(visited, vec![0, 2, 3]);
    }

    #[test]
    fn test_step_unfiltered_clamps() {
        let t = two_rows();
        let mut v = fresh(&t);
        v.step(&t, -1);
        assert_eq!(v.current(), 0);
        v.step(&t, 1);
        v.step(&t, 1);
        v.step(&t, 1);
        assert_eq!(v.current(), 1);
    }

    #[test]
    fn test_clear_filter_keeps_current() {
        let t = two_rows();
        let mut v = fresh(&t);
        v.apply_filter(&t, 1, "41").unwrap();
        v.clear_filter();
        assert!(v.matches().is_empty());
        assert_eq!(v.current(), 1);
    }

    #[test]
    fn test_visibility_intersection_and_fallback() {
        let t = two_rows();
        let mut v = ViewState::new();
        v.reset_for(&t, Some(&["Age".to_string(), "Gone".to_string()]));
        assert_eq!(v.visible_cols(&t), vec![1]);
        assert_eq!(v.visible_names(&t), vec!["Age".to_string()]);

        // empty intersection falls back to all columns
        v.reset_for(&t, Some(&["Gone".to_string()]));
        assert_eq!(v.visible_cols(&t), vec![0, 1]);
    }

    #[test]
    fn test_unselect_all_falls_back_to_all() {
        let t = two_rows();
        let mut v = fresh(&t);
        v.set_all_visible(false);
        assert!(v.visible_names(&t).is_empty());
        assert_eq!(v.visible_cols(&t), vec![0, 1]);
    }

    #[test]
    fn test_toggle_col() {
        let t = two_rows();
        let mut v = fresh(&t);
        v.toggle_col(0);
        assert_eq!(v.visible_cols(&t), vec![1]);
        v.toggle_col(0);
        assert_eq!(v.visible_cols(&t), vec![0, 1]);
    }

    #[test]
    fn test_sort_toggles_direction() {
        // Scenario F: second sort on the same column reverses
        let mut t = two_rows();
        let mut v = fresh(&t);
        assert_eq!(v.sort_request(&mut t, 1), SortDirection::Ascending);
        assert_eq!(t.cell(0, 1), "30");
        assert_eq!(v.sort_request(&mut t, 1), SortDirection::Descending);
        assert_eq!(t.cell(0, 1), "41");
        // a different column starts ascending again
        assert_eq!(v.sort_request(&mut t, 0), SortDirection::Ascending);
    }

    #[test]
    fn test_sort_remaps_current_and_matches() {
        let mut t = Table::new(
            vec!["Name".into(), "Score".into()],
            vec![
                vec!["Ann".into(), "9".into()],
                vec!["Bo".into(), "2".into()],
                vec!["Ann".into(), "5".into()],
            ],
        );
        let mut v = fresh(&t);
        v.apply_filter(&t, 0, "ann").unwrap();
        assert_eq!(v.matches(), &[0, 2]);
        assert_eq!(v.current(), 0); // Ann/9

        v.sort_request(&mut t, 1);
        // rows now: Bo/2, Ann/5, Ann/9 -- match set recomputed
        assert_eq!(v.matches(), &[1, 2]);
        // current still shows Ann/9, now at index 2
        assert_eq!(v.current(), 2);
        assert_eq!(t.cell(v.current(), 1), "9");
        assert_eq!(v.match_pos(), 1);
    }

    #[test]
    fn test_displayed_rows() {
        let t = two_rows();
        let mut v = fresh(&t);
        assert_eq!(v.displayed_rows(&t), vec![0, 1]);
        v.apply_filter(&t, 1, "41").unwrap();
        assert_eq!(v.displayed_rows(&t), vec![1]);
    }

    #[test]
    fn test_expansion_resets_on_record_change() {
        let t = two_rows();
        let mut v = fresh(&t);
        v.toggle_expanded(1);
        assert!(v.is_expanded(1));
        v.toggle_expanded(1);
        assert!(!v.is_expanded(1));

        v.toggle_expanded(0);
        v.step(&t, 1);
        assert!(!v.is_expanded(0));
    }

    #[test]
    fn test_view_mode_strings() {
        assert_eq!(ViewMode::Form.as_str(), "form");
        assert_eq!(ViewMode::from_str("table"), Some(ViewMode::Table));
        assert_eq!(ViewMode::from_str("bogus"), None);
        assert_eq!(ViewMode::Form.toggled(), ViewMode::Table);
    }
}
