// src/transform.rs
use serde_json::Value;
use thiserror::Error;

use crate::data_types::{Cell, Record, RowIssue, SheetTable};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    #[error("sheet data is not an array of rows")]
    NotAnArray,
    #[error("row {row} is not an array of cells")]
    RowNotAnArray { row: usize },
    #[error("row {row}, column {column} holds a nested value")]
    UnsupportedCell { row: usize, column: usize },
}

pub struct SheetTransform {}

impl SheetTransform {
    pub fn new() -> Self {
        SheetTransform {}
    }

    /// Builds records from the backend's `sheetData`. Absent data is an empty
    /// table, a non-array shape is an error.
    pub fn transform(&self, sheet_data: &Value) -> Result<SheetTable, TransformError> {
        let rows = Self::parse_rows(sheet_data)?;
        Ok(Self::records_from_rows(&rows))
    }

    fn parse_rows(sheet_data: &Value) -> Result<Vec<Vec<Cell>>, TransformError> {
        let rows = match sheet_data {
            Value::Null => return Ok(Vec::new()),
            Value::Array(rows) => rows,
            _ => return Err(TransformError::NotAnArray),
        };

        rows.iter()
            .enumerate()
            .map(|(row_index, row)| {
                let cells = row
                    .as_array()
                    .ok_or(TransformError::RowNotAnArray { row: row_index })?;
                cells
                    .iter()
                    .enumerate()
                    .map(|(column, value)| {
                        Cell::from_json(value).ok_or(TransformError::UnsupportedCell {
                            row: row_index,
                            column,
                        })
                    })
                    .collect()
            })
            .collect()
    }

    /// Zips every data row with the header row. Row 0 is the header.
    pub fn records_from_rows(rows: &[Vec<Cell>]) -> SheetTable {
        let mut table = SheetTable::empty();
        if rows.len() < 2 {
            return table;
        }

        let header_keys: Vec<String> = rows[0].iter().map(Cell::as_string).collect();
        table.columns = Self::process_headers(&header_keys);

        for (index, row) in rows.iter().enumerate().skip(1) {
            if row.len() != header_keys.len() {
                table.issues.push(RowIssue {
                    row: index,
                    expected: header_keys.len(),
                    found: row.len(),
                });
            }

            // Later duplicates overwrite earlier values, values past the header are dropped
            let record: Record = header_keys
                .iter()
                .enumerate()
                .map(|(i, key)| {
                    let cell = row.get(i).cloned().unwrap_or_else(|| Cell::text(""));
                    (key.clone(), cell)
                })
                .collect();

            table.records.push(record);
        }

        table
    }

    fn process_headers(header_keys: &[String]) -> Vec<String> {
        let mut columns: Vec<String> = Vec::with_capacity(header_keys.len());
        for key in header_keys {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
        columns
    }
}
