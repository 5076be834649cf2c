// src/data_types.rs
use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

/// Payload returned by the spreadsheet-parsing backend.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSheet {
    #[serde(default)]
    pub sheet_name: String,
    #[serde(default)]
    pub num_of_sheets: u32,
    /// Header row followed by data rows. Kept as raw JSON so that a malformed
    /// shape is reported by the transform step instead of the upload client.
    #[serde(default)]
    pub sheet_data: Value,
}

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Bool(bool),
    Empty,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Converts a JSON scalar into a cell. Objects and arrays are not cells.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(Cell::Empty),
            Value::Bool(b) => Some(Cell::Bool(*b)),
            Value::Number(n) => n.as_f64().map(Cell::Number),
            Value::String(s) => Some(Cell::Text(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// String form used for column keys, filtering and sorting.
    pub fn as_string(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => format_number(*n),
            Cell::Bool(b) => b.to_string(),
            Cell::Empty => String::new(),
        }
    }
}

fn format_number(n: f64) -> String {
    if n == 0.0 {
        // Covers -0.0 as well
        return "0".to_string();
    }
    if !n.is_finite() {
        return n.to_string();
    }
    let magnitude = n.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        // Exponent form past the same thresholds as the backend's JSON runtime: 1e+21, 1e-7
        let formatted = format!("{:e}", n);
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => formatted,
        };
    }
    // Shortest round-trip digits, never a trailing `.0`
    n.to_string()
}

static EMPTY_CELL: Cell = Cell::Empty;

/// One data row keyed by column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    cells: HashMap<String, Cell>,
}

impl Record {
    pub fn new() -> Self {
        Record::default()
    }

    /// Inserts a value, overwriting any earlier value under the same column.
    pub fn insert(&mut self, column: impl Into<String>, cell: Cell) {
        self.cells.insert(column.into(), cell);
    }

    pub fn get(&self, column: &str) -> &Cell {
        self.cells.get(column).unwrap_or(&EMPTY_CELL)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Cell)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, Cell)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (column, cell) in iter {
            record.insert(column, cell);
        }
        record
    }
}

/// A data row whose width did not match the header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIssue {
    /// 1-based index among the data rows.
    pub row: usize,
    pub expected: usize,
    pub found: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetTable {
    /// Distinct column names in header order.
    pub columns: Vec<String>,
    pub records: Vec<Record>,
    pub issues: Vec<RowIssue>,
}

impl SheetTable {
    pub fn empty() -> Self {
        SheetTable {
            columns: Vec::new(),
            records: Vec::new(),
            issues: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
