use rayon::prelude::*;

use crate::domain::PAGE_SIZES;
use crate::parse::Row;

/// A page cell handed to the rendering side: either a value shown verbatim
/// or the distinguished null marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    Null,
    Text(String),
}

/// Pagination/filter state of one table view.
///
/// `filtered` maps view positions to indices into the source rows, in
/// source order. `page` is 1-based and always within
/// `1..=max(1, ceil(filtered.len() / page_size))`.
#[derive(Debug)]
pub struct ViewState {
    page: usize,
    page_size: usize,
    term: String,
    filtered: Vec<usize>,
    cursor: usize,
}

impl ViewState {
    pub fn new(page_size: usize) -> Self {
        ViewState {
            page: 1,
            page_size,
            term: String::new(),
            filtered: Vec::new(),
            cursor: 0,
        }
    }

    /// New dataset or initial boot: show everything, back to page one. The
    /// page size survives dataset switches.
    pub fn reset(&mut self, source_len: usize) {
        self.filtered = (0..source_len).collect();
        self.page = 1;
        self.cursor = 0;
        self.term.clear();
    }

    /// Apply a search term against the source rows. An empty term restores
    /// the full view; otherwise a row matches when any non-null field
    /// contains the term, case-insensitively. Always jumps to page one.
    pub fn search(&mut self, rows: &[Row], term: &str) {
        self.term = term.to_string();
        if term.is_empty() {
            self.filtered = (0..rows.len()).collect();
        } else {
            let needle = term.to_lowercase();
            // Indexed parallel collect keeps the source order.
            self.filtered = rows
                .par_iter()
                .enumerate()
                .filter(|(_, row)| row_matches(row, &needle))
                .map(|(idx, _)| idx)
                .collect();
        }
        self.page = 1;
        self.cursor = 0;
    }

    pub fn set_page_size(&mut self, size: usize) {
        if !PAGE_SIZES.contains(&size) {
            return;
        }
        self.page_size = size;
        self.page = 1;
        self.cursor = 0;
    }

    pub fn cycle_page_size(&mut self) {
        let pos = PAGE_SIZES
            .iter()
            .position(|&s| s == self.page_size)
            .unwrap_or(0);
        self.set_page_size(PAGE_SIZES[(pos + 1) % PAGE_SIZES.len()]);
    }

    pub fn next_page(&mut self) {
        if self.page < self.max_page() {
            self.page += 1;
            self.cursor = 0;
        }
    }

    pub fn prev_page(&mut self) {
        if self.page > 1 {
            self.page -= 1;
            self.cursor = 0;
        }
    }

    pub fn max_page(&self) -> usize {
        std::cmp::max(1, self.filtered.len().div_ceil(self.page_size))
    }

    pub fn page_info(&self) -> String {
        format!("Page {} of {}", self.page, self.max_page())
    }

    pub fn has_next(&self) -> bool {
        self.page < self.max_page()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn match_count(&self) -> usize {
        self.filtered.len()
    }

    /// Source-row indices of the current page.
    pub fn page_indices(&self) -> &[usize] {
        let begin = (self.page - 1) * self.page_size;
        let end = std::cmp::min(begin + self.page_size, self.filtered.len());
        if begin >= end {
            &[]
        } else {
            &self.filtered[begin..end]
        }
    }

    /// Project the current page into displayable cells, one `Vec<CellValue>`
    /// per row in the column order of `columns`.
    pub fn page_cells(&self, rows: &[Row], columns: &[String]) -> Vec<Vec<CellValue>> {
        self.page_indices()
            .iter()
            .map(|&idx| {
                columns
                    .iter()
                    .map(|col| match rows[idx].get(col) {
                        Some(Some(value)) => CellValue::Text(value.clone()),
                        _ => CellValue::Null,
                    })
                    .collect()
            })
            .collect()
    }

    // Cursor: row selection inside the current page, TUI-side only.

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn move_cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_down(&mut self) {
        let page_len = self.page_indices().len();
        if page_len > 0 && self.cursor < page_len - 1 {
            self.cursor += 1;
        }
    }

    /// Source-row index under the cursor, if the page is non-empty.
    pub fn selected_row(&self) -> Option<usize> {
        self.page_indices().get(self.cursor).copied()
    }
}

fn row_matches(row: &Row, needle: &str) -> bool {
    row.values().any(|value| {
        value
            .as_deref()
            .is_some_and(|v| v.to_lowercase().contains(needle))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_csv;

    fn state_with(len: usize, page_size: usize) -> ViewState {
        let mut state = ViewState::new(page_size);
        state.reset(len);
        state
    }

    #[test]
    fn pagination_bounds() {
        let mut state = state_with(5, 50);
        state.set_page_size(2);
        assert_eq!(state.max_page(), 3);

        state.next_page();
        state.next_page();
        assert_eq!(state.page(), 3);
        assert!(!state.has_next());
        state.next_page(); // no-op at the last page
        assert_eq!(state.page(), 3);

        state.prev_page();
        state.prev_page();
        assert_eq!(state.page(), 1);
        assert!(!state.has_prev());
        state.prev_page(); // no-op at the first page
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn empty_view_still_has_one_page() {
        let state = state_with(0, 50);
        assert_eq!(state.max_page(), 1);
        assert_eq!(state.page_info(), "Page 1 of 1");
        assert!(state.page_indices().is_empty());
        assert!(state.selected_row().is_none());
    }

    #[test]
    fn page_slice_is_clipped() {
        let mut state = state_with(5, 50);
        state.set_page_size(2);
        assert_eq!(state.page_indices(), &[0, 1]);
        state.next_page();
        assert_eq!(state.page_indices(), &[2, 3]);
        state.next_page();
        assert_eq!(state.page_indices(), &[4]);
    }

    #[test]
    fn search_filters_and_resets_page() {
        let rows = parse_csv("a,b\nfoo,1\nbar,2\nFOOD,3").unwrap().rows;
        let mut state = state_with(rows.len(), 50);
        state.next_page(); // stays at 1, single page

        state.search(&rows, "foo");
        assert_eq!(state.match_count(), 2);
        assert_eq!(state.page_indices(), &[0, 2]);
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn empty_search_restores_source_order() {
        let rows = parse_csv("a\nx\ny\nz").unwrap().rows;
        let mut state = state_with(rows.len(), 50);
        state.search(&rows, "y");
        assert_eq!(state.page_indices(), &[1]);
        state.search(&rows, "");
        assert_eq!(state.page_indices(), &[0, 1, 2]);
        assert_eq!(state.term(), "");
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let rows = parse_csv("a\nHello World\ngoodbye").unwrap().rows;
        let mut state = state_with(rows.len(), 50);
        state.search(&rows, "WORL");
        assert_eq!(state.match_count(), 1);
        assert_eq!(state.page_indices(), &[0]);
    }

    #[test]
    fn null_fields_never_match() {
        let rows = parse_csv("a,b\nnull,match\nnull,other").unwrap().rows;
        let mut state = state_with(rows.len(), 50);
        // "null" as a term must not hit the null-valued a fields.
        state.search(&rows, "null");
        assert_eq!(state.match_count(), 0);
        state.search(&rows, "match");
        assert_eq!(state.page_indices(), &[0]);
    }

    #[test]
    fn filtered_order_matches_source_order() {
        let rows = parse_csv("a\nm3\nm1\nx\nm2").unwrap().rows;
        let mut state = state_with(rows.len(), 50);
        state.search(&rows, "m");
        assert_eq!(state.page_indices(), &[0, 1, 3]);
    }

    #[test]
    fn page_size_change_resets_page() {
        let mut state = state_with(300, 50);
        state.next_page();
        assert_eq!(state.page(), 2);
        state.set_page_size(100);
        assert_eq!(state.page(), 1);
        assert_eq!(state.max_page(), 3);
    }

    #[test]
    fn invalid_page_size_is_ignored() {
        let mut state = state_with(10, 50);
        state.set_page_size(7);
        assert_eq!(state.page_size(), 50);
    }

    #[test]
    fn cycle_walks_the_size_set() {
        let mut state = state_with(10, 50);
        state.cycle_page_size();
        assert_eq!(state.page_size(), 100);
        state.cycle_page_size();
        assert_eq!(state.page_size(), 200);
        state.cycle_page_size();
        assert_eq!(state.page_size(), 50);
    }

    #[test]
    fn page_cells_mark_nulls() {
        let table = parse_csv("a,b\n1,\n2,x").unwrap();
        let mut state = ViewState::new(50);
        state.reset(table.rows.len());
        let cells = state.page_cells(&table.rows, &table.columns);
        assert_eq!(cells[0][0], CellValue::Text("1".to_string()));
        assert_eq!(cells[0][1], CellValue::Null);
        assert_eq!(cells[1][1], CellValue::Text("x".to_string()));
    }

    #[test]
    fn cursor_stays_inside_the_page() {
        let mut state = state_with(3, 50);
        state.move_cursor_up(); // already at the top
        assert_eq!(state.cursor(), 0);
        state.move_cursor_down();
        state.move_cursor_down();
        state.move_cursor_down(); // clamped at the last row
        assert_eq!(state.cursor(), 2);
        assert_eq!(state.selected_row(), Some(2));
    }
}
