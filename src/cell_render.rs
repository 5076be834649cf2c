// src/cell_render.rs
use chrono::{Duration, NaiveDate};

use crate::data_types::Cell;

pub const LINK_LABEL: &str = "Open Link";
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// How a cell is shown in the table.
#[derive(Debug, Clone, PartialEq)]
pub enum CellDisplay {
    Link(String),
    Date(NaiveDate),
    Text(String),
}

impl CellDisplay {
    pub fn label(&self, date_format: &str) -> String {
        match self {
            CellDisplay::Link(_) => LINK_LABEL.to_string(),
            CellDisplay::Date(date) => date.format(date_format).to_string(),
            CellDisplay::Text(text) => text.clone(),
        }
    }
}

/// Decides the display of `cell` in `column`. Never fails: anything that is not
/// a link or a convertible date falls back to the cell's string form.
pub fn interpret(column: &str, cell: &Cell) -> CellDisplay {
    match cell {
        Cell::Text(s) if s.starts_with("http") => CellDisplay::Link(s.clone()),
        Cell::Number(n) if column.to_lowercase().contains("date") => match excel_serial_to_date(*n) {
            Some(date) => CellDisplay::Date(date),
            None => CellDisplay::Text(cell.as_string()),
        },
        _ => CellDisplay::Text(cell.as_string()),
    }
}

/// Excel 1900 date system: day `serial` is `1900-01-01 + (serial - 2)` days.
/// The offset absorbs both the 1-based serials and the phantom 1900-02-29.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let millis = (serial - 2.0) * MILLIS_PER_DAY;
    if millis.abs() > i64::MAX as f64 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1900, 1, 1)?.and_hms_opt(0, 0, 0)?;
    let offset = Duration::try_milliseconds(millis as i64)?;
    epoch.checked_add_signed(offset).map(|dt| dt.date())
}
