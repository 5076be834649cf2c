// src/table_state.rs
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn indicator(direction: Option<SortDirection>) -> &'static str {
        match direction {
            Some(SortDirection::Ascending) => "↑",
            Some(SortDirection::Descending) => "↓",
            None => "↕",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

/// Sort and filter state of the table view. Reset whenever a new sheet loads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableState {
    pub global_filter: String,
    pub column_filters: BTreeMap<String, String>,
    pub sorting: Vec<SortSpec>,
}

impl TableState {
    pub fn new() -> Self {
        TableState::default()
    }

    pub fn set_global_filter(&mut self, value: String) {
        self.global_filter = value;
    }

    /// An empty value removes the column's filter.
    pub fn set_column_filter(&mut self, column: &str, value: String) {
        if value.is_empty() {
            self.column_filters.remove(column);
        } else {
            self.column_filters.insert(column.to_string(), value);
        }
    }

    pub fn column_filter(&self, column: &str) -> &str {
        self.column_filters.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn clear_filters(&mut self) {
        self.global_filter.clear();
        self.column_filters.clear();
    }

    pub fn sort_direction(&self, column: &str) -> Option<SortDirection> {
        self.sorting
            .iter()
            .find(|spec| spec.column == column)
            .map(|spec| spec.direction)
    }

    /// Cycles the column through unsorted, ascending and descending. Sorting
    /// a different column replaces the current sort.
    pub fn toggle_sort(&mut self, column: &str) {
        let next = match self.sort_direction(column) {
            None => Some(SortDirection::Ascending),
            Some(SortDirection::Ascending) => Some(SortDirection::Descending),
            Some(SortDirection::Descending) => None,
        };

        self.sorting.clear();
        if let Some(direction) = next {
            self.sorting.push(SortSpec {
                column: column.to_string(),
                direction,
            });
        }
    }
}
