use std::collections::BTreeSet;

use crate::models::{Entry, Item};

/// Top-level pages. The index is what gets persisted between runs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Page {
    Input,
    Data,
}

impl Page {
    pub(crate) fn index(self) -> usize {
        match self {
            Page::Input => 0,
            Page::Data => 1,
        }
    }

    /// Unknown indexes fall back to the input page.
    pub(crate) fn from_index(index: usize) -> Self {
        match index {
            1 => Page::Data,
            _ => Page::Input,
        }
    }

    pub(crate) fn toggle(self) -> Self {
        match self {
            Page::Input => Page::Data,
            Page::Data => Page::Input,
        }
    }

    pub(crate) fn title(self) -> &'static str {
        match self {
            Page::Input => "Input View",
            Page::Data => "Data View",
        }
    }
}

/// Read model behind the data page: every stored entry plus a cursor and the
/// rows the user has marked for deletion.
pub(crate) struct EntryTable {
    pub(crate) entries: Vec<Entry>,
    pub(crate) selected: usize,
    pub(crate) marked: BTreeSet<i64>,
}

impl EntryTable {
    pub(crate) fn new(entries: Vec<Entry>) -> Self {
        let mut table = Self {
            entries: Vec::new(),
            selected: 0,
            marked: BTreeSet::new(),
        };
        table.set_entries(entries);
        table
    }

    /// Swap in freshly queried rows. Marks on rows that disappeared are
    /// dropped and the cursor is pulled back into range.
    pub(crate) fn set_entries(&mut self, entries: Vec<Entry>) {
        self.entries = entries;
        let live: BTreeSet<i64> = self.entries.iter().map(|e| e.id).collect();
        self.marked.retain(|id| live.contains(id));
        self.ensure_in_bounds();
    }

    /// Put the cursor on `id` if it is present.
    pub(crate) fn focus_id(&mut self, id: i64) {
        if let Some(idx) = self.entries.iter().position(|e| e.id == id) {
            self.selected = idx;
        }
    }

    pub(crate) fn current_entry(&self) -> Option<&Entry> {
        self.entries.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.entries.is_empty() {
            return;
        }
        let len = self.entries.len() as isize;
        let new = (self.selected as isize + offset).clamp(0, len - 1);
        self.selected = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.entries.len().saturating_sub(1);
    }

    /// Toggle the mark on the cursor row. Returns the new state, or `None`
    /// for an empty table.
    pub(crate) fn toggle_mark(&mut self) -> Option<bool> {
        let id = self.current_entry()?.id;
        if self.marked.remove(&id) {
            Some(false)
        } else {
            self.marked.insert(id);
            Some(true)
        }
    }

    pub(crate) fn clear_marks(&mut self) {
        self.marked.clear();
    }

    pub(crate) fn is_marked(&self, id: i64) -> bool {
        self.marked.contains(&id)
    }

    /// Rows a delete applies to: the marked rows, otherwise the cursor row.
    /// Empty when the table is empty.
    pub(crate) fn selected_ids(&self) -> BTreeSet<i64> {
        if !self.marked.is_empty() {
            return self.marked.clone();
        }
        self.current_entry()
            .map(|entry| BTreeSet::from([entry.id]))
            .unwrap_or_default()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn ensure_in_bounds(&mut self) {
        if self.entries.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.entries.len() {
            self.selected = self.entries.len() - 1;
        }
    }
}

/// Column headers for the data page, in table order.
pub(crate) fn table_header() -> Vec<String> {
    let mut header = vec![
        " ".to_string(),
        "ID".to_string(),
        "Date".to_string(),
        "Time".to_string(),
    ];
    header.extend(Item::ALL.iter().map(|item| item.abbrev().to_string()));
    header.push("Sum".to_string());
    header
}

/// Cells for one entry, aligned with [`table_header`].
pub(crate) fn table_cells(entry: &Entry, marked: bool) -> Vec<String> {
    let mut cells = vec![
        if marked { "✔" } else { " " }.to_string(),
        entry.id.to_string(),
        entry.date.clone(),
        entry.time.clone(),
    ];
    cells.extend(entry.items.values().iter().map(|v| v.to_string()));
    cells.push(entry.summary.to_string());
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemScores;

    fn entry(id: i64) -> Entry {
        Entry {
            id,
            date: "2024-01-15".into(),
            time: "09:30:00".into(),
            items: ItemScores::default(),
            summary: 0,
        }
    }

    #[test]
    fn empty_table_selects_nothing() {
        let mut table = EntryTable::new(Vec::new());
        assert!(table.selected_ids().is_empty());
        assert_eq!(table.toggle_mark(), None);
        table.move_selection(3);
        assert_eq!(table.selected, 0);
    }

    #[test]
    fn cursor_row_is_the_fallback_selection() {
        let mut table = EntryTable::new(vec![entry(1), entry(2), entry(3)]);
        table.move_selection(1);
        assert_eq!(table.selected_ids(), BTreeSet::from([2]));
    }

    #[test]
    fn marks_take_precedence_over_cursor() {
        let mut table = EntryTable::new(vec![entry(1), entry(2), entry(3)]);
        assert_eq!(table.toggle_mark(), Some(true));
        table.select_last();
        assert_eq!(table.toggle_mark(), Some(true));
        table.move_selection(-1);

        assert_eq!(table.selected_ids(), BTreeSet::from([1, 3]));
        table.select_first();
        assert_eq!(table.toggle_mark(), Some(false));
        assert_eq!(table.selected_ids(), BTreeSet::from([3]));
    }

    #[test]
    fn refresh_prunes_marks_and_clamps_cursor() {
        let mut table = EntryTable::new(vec![entry(1), entry(2), entry(3)]);
        table.select_last();
        table.toggle_mark();
        table.set_entries(vec![entry(1)]);

        assert!(table.marked.is_empty());
        assert_eq!(table.selected, 0);
        assert_eq!(table.current_entry().map(|e| e.id), Some(1));
    }

    #[test]
    fn page_index_round_trips() {
        for page in [Page::Input, Page::Data] {
            assert_eq!(Page::from_index(page.index()), page);
        }
        assert_eq!(Page::from_index(42), Page::Input);
        assert_eq!(Page::Input.toggle(), Page::Data);
    }

    #[test]
    fn cells_line_up_with_header() {
        assert_eq!(table_cells(&entry(7), true).len(), table_header().len());
    }
}
