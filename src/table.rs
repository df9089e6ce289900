use std::cmp::Ordering;

use crate::text::sortable_number;

/// Sorting direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// One decoded sheet: a header row plus data rows.
///
/// Positions, not header names, identify columns; duplicate header text
/// is allowed. Records may be shorter than the header row, in which
/// case the missing cells read as empty.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// The explicit "no data" table.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.headers.len()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Display label for a column: its header text, or a positional
    /// fallback when the header cell was blank.
    pub fn header_label(&self, col: usize) -> String {
        match self.headers.get(col) {
            Some(h) if !h.is_empty() => h.clone(),
            _ => format!("Column {}", col + 1),
        }
    }

    /// Cell lookup by position; out-of-range reads are empty.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn row(&self, idx: usize) -> Option<&[String]> {
        self.rows.get(idx).map(Vec::as_slice)
    }

    /// Sort rows in place by the given column. Returns the permutation
    /// (new position -> previous index) so callers can remap any
    /// absolute indices they hold.
    ///
    /// Each pair is compared numerically when both cells have numeric
    /// content (digits, dots, a leading minus), otherwise by
    /// case-folded text. Good enough for display; no locale claims.
    pub fn sort_by(&mut self, col: usize, direction: SortDirection) -> Vec<usize> {
        let mut perm: Vec<usize> = (0..self.rows.len()).collect();
        perm.sort_by(|&a, &b| {
            let va = self.cell(a, col);
            let vb = self.cell(b, col);
            let ord = compare_cells(va, vb);
            match direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });

        let mut sorted = Vec::with_capacity(self.rows.len());
        for &old in &perm {
            sorted.push(std::mem::take(&mut self.rows[old]));
        }
        self.rows = sorted;
        perm
    }
}

fn compare_cells(a: &str, b: &str) -> Ordering {
    if let (Some(na), Some(nb)) = (sortable_number(a), sortable_number(b)) {
        return na.partial_cmp(&nb).unwrap_or(Ordering::Equal);
    }
    a.to_lowercase().cmp(&b.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> Table {
        Table::new(
            vec!["Name".into(), "Age".into()],
            vec![
                vec!["Ann".into(), "30".into()],
                vec!["Bo".into(), "41".into()],
                vec!["cy".into(), "7".into()],
            ],
        )
    }

    #[test]
    fn test_cell_out_of_range() {
        let t = people();
        assert_eq!(t.cell(0, 0), "Ann");
        assert_eq!(t.cell(0, 5), "");
        assert_eq!(t.cell(99, 0), "");
    }

    #[test]
    fn test_short_rows_read_empty() {
        let t = Table::new(vec!["A".into(), "B".into()], vec![vec!["only".into()]]);
        assert_eq!(t.cell(0, 1), "");
    }

    #[test]
    fn test_header_label_fallback() {
        let t = Table::new(vec!["Name".into(), "".into()], vec![]);
        assert_eq!(t.header_label(0), "Name");
        assert_eq!(t.header_label(1), "Column 2");
    }

    #[test]
    fn test_sort_numeric() {
        let mut t = people();
        let perm = t.sort_by(1, SortDirection::Ascending);
        assert_eq!(perm, vec![2, 0, 1]);
        assert_eq!(t.cell(0, 0), "cy");
        assert_eq!(t.cell(2, 1), "41");

        t.sort_by(1, SortDirection::Descending);
        assert_eq!(t.cell(0, 1), "41");
        assert_eq!(t.cell(2, 1), "7");
    }

    #[test]
    fn test_sort_text_case_folded() {
        let mut t = people();
        t.sort_by(0, SortDirection::Ascending);
        // lowercase "cy" still sorts after "Bo"
        assert_eq!(t.cell(0, 0), "Ann");
        assert_eq!(t.cell(1, 0), "Bo");
        assert_eq!(t.cell(2, 0), "cy");
    }

    #[test]
    fn test_sort_numeric_with_units() {
        let mut t = Table::new(
            vec!["Price".into()],
            vec![vec!["$100".into()], vec!["$25".into()], vec!["$3".into()]],
        );
        t.sort_by(0, SortDirection::Ascending);
        assert_eq!(t.cell(0, 0), "$3");
        assert_eq!(t.cell(1, 0), "$25");
        assert_eq!(t.cell(2, 0), "$100");
    }
}
