// src/engine.rs
use std::cmp::Ordering;

use crate::data_types::{Record, SheetTable};
use crate::table_state::{SortDirection, TableState};

/// Derives the visible rows from scratch: filters first, then a stable sort.
pub fn visible_records<'a>(table: &'a SheetTable, state: &TableState) -> Vec<&'a Record> {
    let global = state.global_filter.to_lowercase();
    let column_filters: Vec<(&str, String)> = state
        .column_filters
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(column, value)| (column.as_str(), value.to_lowercase()))
        .collect();

    let mut rows: Vec<&Record> = table
        .records
        .iter()
        .filter(|record| matches_global(record, &table.columns, &global))
        .filter(|record| {
            column_filters
                .iter()
                .all(|(column, needle)| contains_ignore_case(record, column, needle))
        })
        .collect();

    if !state.sorting.is_empty() {
        rows.sort_by(|a, b| {
            state
                .sorting
                .iter()
                .map(|spec| {
                    let ordering = compare_values(&a.get(&spec.column).as_string(), &b.get(&spec.column).as_string());
                    match spec.direction {
                        SortDirection::Ascending => ordering,
                        SortDirection::Descending => ordering.reverse(),
                    }
                })
                .find(|ordering| *ordering != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
    }

    rows
}

fn matches_global(record: &Record, columns: &[String], needle: &str) -> bool {
    needle.is_empty()
        || columns
            .iter()
            .any(|column| contains_ignore_case(record, column, needle))
}

// `needle` is already lowercased
fn contains_ignore_case(record: &Record, column: &str, needle: &str) -> bool {
    record.get(column).as_string().to_lowercase().contains(needle)
}

/// Numeric comparison when both sides parse as numbers, string comparison when
/// neither does. Numbers order before text so the ordering stays total on
/// mixed columns.
pub fn compare_values(a: &str, b: &str) -> Ordering {
    match (parse_number(a), parse_number(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::SheetTransform;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn people() -> SheetTable {
        SheetTransform::new()
            .transform(&json!([
                ["Name", "Age", "City"],
                ["Alice", "30", "Oslo"],
                ["Bob", "25", "Bergen"],
                ["Carol", "100", "Oslo"],
                ["Dave", "25", "Tromsø"]
            ]))
            .unwrap()
    }

    fn names(rows: &[&Record]) -> Vec<String> {
        rows.iter().map(|r| r.get("Name").as_string()).collect()
    }

    #[test]
    fn empty_state_returns_records_in_order() {
        let table = people();
        let rows = visible_records(&table, &TableState::new());
        assert_eq!(names(&rows), vec!["Alice", "Bob", "Carol", "Dave"]);
    }

    #[test]
    fn global_filter_is_case_insensitive_substring() {
        let table = people();
        let mut state = TableState::new();
        state.set_global_filter("ali".to_string());
        assert_eq!(names(&visible_records(&table, &state)), vec!["Alice"]);

        state.set_global_filter("OSLO".to_string());
        assert_eq!(names(&visible_records(&table, &state)), vec!["Alice", "Carol"]);

        state.set_global_filter("nobody".to_string());
        assert!(visible_records(&table, &state).is_empty());
    }

    #[test]
    fn global_filter_output_is_an_ordered_subsequence() {
        let table = people();
        let mut state = TableState::new();
        state.set_global_filter("2".to_string());
        let rows = visible_records(&table, &state);
        assert_eq!(names(&rows), vec!["Bob", "Dave"]);
        for row in rows {
            assert!(table.columns.iter().any(|c| row.get(c).as_string().contains('2')));
        }
    }

    #[test]
    fn column_filters_and_global_filter_intersect() {
        let table = people();
        let mut state = TableState::new();
        state.set_column_filter("City", "oslo".to_string());
        assert_eq!(names(&visible_records(&table, &state)), vec!["Alice", "Carol"]);

        state.set_global_filter("car".to_string());
        assert_eq!(names(&visible_records(&table, &state)), vec!["Carol"]);

        state.set_column_filter("Age", "30".to_string());
        assert!(visible_records(&table, &state).is_empty());
    }

    #[test]
    fn ascending_sort_is_numeric_when_values_are_numbers() {
        let table = SheetTransform::new()
            .transform(&json!([["Name", "Age"], ["Alice", "30"], ["Bob", "25"]]))
            .unwrap();
        let mut state = TableState::new();
        state.toggle_sort("Age");
        assert_eq!(names(&visible_records(&table, &state)), vec!["Bob", "Alice"]);
    }

    #[test]
    fn sort_is_stable_in_both_directions() {
        let table = people();
        let mut state = TableState::new();
        state.toggle_sort("Age");
        assert_eq!(names(&visible_records(&table, &state)), vec!["Bob", "Dave", "Alice", "Carol"]);
        state.toggle_sort("Age");
        assert_eq!(names(&visible_records(&table, &state)), vec!["Carol", "Alice", "Bob", "Dave"]);
    }

    #[test]
    fn three_toggles_restore_original_order() {
        let table = people();
        let mut state = TableState::new();
        for _ in 0..3 {
            state.toggle_sort("City");
        }
        assert_eq!(names(&visible_records(&table, &state)), vec!["Alice", "Bob", "Carol", "Dave"]);
    }

    #[test]
    fn numbers_order_before_text() {
        assert_eq!(compare_values("10", "9"), Ordering::Greater);
        assert_eq!(compare_values("10", "9a"), Ordering::Less);
        assert_eq!(compare_values("", "1"), Ordering::Greater);
        assert_eq!(compare_values("b", "a"), Ordering::Greater);
        assert_eq!(compare_values("1a", "b"), Ordering::Less);
    }

    #[test]
    fn mixed_comparisons_are_transitive() {
        // 1a < 9 by text and 10 < 1a by text would form a cycle with 9 < 10
        assert_eq!(compare_values("9", "10"), Ordering::Less);
        assert_eq!(compare_values("10", "1a"), Ordering::Less);
        assert_eq!(compare_values("9", "1a"), Ordering::Less);
    }

    fn codes_table(codes: &[String]) -> SheetTable {
        let mut rows = vec![json!(["Code", "Seq"])];
        rows.extend(codes.iter().enumerate().map(|(i, code)| json!([code, i])));
        SheetTransform::new().transform(&json!(rows)).unwrap()
    }

    #[test]
    fn mixed_column_sorts_totally_and_stably() {
        let pattern = ["10", "9", "1a", "2b", "9", "b", "1a", "100", "-3", "a", "10", "2b"];
        let codes: Vec<String> = pattern.iter().cycle().take(40).map(|c| c.to_string()).collect();
        let table = codes_table(&codes);

        for toggles in 1..=2 {
            let mut state = TableState::new();
            for _ in 0..toggles {
                state.toggle_sort("Code");
            }
            let rows = visible_records(&table, &state);
            assert_eq!(rows.len(), 40);

            for pair in rows.windows(2) {
                let a = pair[0].get("Code").as_string();
                let b = pair[1].get("Code").as_string();
                let ordering = compare_values(&a, &b);
                let ordering = if toggles == 1 { ordering } else { ordering.reverse() };
                assert_ne!(ordering, Ordering::Greater, "{} then {}", a, b);

                if a == b {
                    let seq_a = pair[0].get("Seq").as_string().parse::<usize>().unwrap();
                    let seq_b = pair[1].get("Seq").as_string().parse::<usize>().unwrap();
                    assert!(seq_a < seq_b, "equal codes {} out of input order", a);
                }
            }
        }

        let mut state = TableState::new();
        state.toggle_sort("Code");
        let first: Vec<String> = visible_records(&table, &state)
            .iter()
            .take(4)
            .map(|r| r.get("Code").as_string())
            .collect();
        assert_eq!(first, vec!["-3", "-3", "-3", "9"]);
    }

    #[test]
    fn empty_cells_from_short_rows_sort_after_numbers() {
        let table = SheetTransform::new()
            .transform(&json!([
                ["Name", "Score"],
                ["Ann", 12],
                ["Ben"],
                ["Cy", 3],
                ["Dee"],
                ["Eve", 12]
            ]))
            .unwrap();
        let mut state = TableState::new();
        state.toggle_sort("Score");
        assert_eq!(names(&visible_records(&table, &state)), vec!["Cy", "Ann", "Eve", "Ben", "Dee"]);

        state.toggle_sort("Score");
        assert_eq!(names(&visible_records(&table, &state)), vec!["Ben", "Dee", "Ann", "Eve", "Cy"]);
    }
}
