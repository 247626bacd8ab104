//! Heuristic extraction of study hours from a loosely formatted sheet
//!
//! Employee sheets have no fixed layout. The extractor:
//! 1. finds where data starts: the row after a `study id` header, or the first
//!    row already holding a study id (row 0 if neither is found)
//! 2. picks the first column in the data region holding a study id
//! 3. keeps only rows whose value in that column is a study id
//! 4. sums the row's numeric columns (classified once for the whole sheet)

use calamine::Data;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

use super::SheetEntry;

static STUDY_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^STUDY\d+$").unwrap());

const HEADER_TOKEN: &str = "study id";

/// Extract study rows from a sheet grid
pub fn extract_sheet(grid: &[Vec<Data>], sheet_name: &str) -> Vec<SheetEntry> {
    if grid.is_empty() {
        return Vec::new();
    }

    let start = find_data_start(grid);
    let region = &grid[start..];

    let Some(study_col) = find_study_column(region) else {
        log::debug!("Sheet '{}': no study id column", sheet_name);
        return Vec::new();
    };

    let numeric_cols = numeric_columns(grid);

    let entries: Vec<SheetEntry> = region
        .iter()
        .filter_map(|row| {
            let study = cell_text(row.get(study_col)?);
            if !is_study_id(&study) {
                return None;
            }
            Some(SheetEntry {
                study_id: study.to_uppercase(),
                hours: row_hours(row, &numeric_cols),
                sheet: sheet_name.to_string(),
            })
        })
        .collect();

    log::debug!(
        "Sheet '{}': data from row {}, study column {}, {} numeric columns, {} rows",
        sheet_name,
        start,
        study_col,
        numeric_cols.len(),
        entries.len()
    );

    entries
}

/// Whether a trimmed cell value is a study identifier
pub fn is_study_id(text: &str) -> bool {
    STUDY_ID.is_match(text.trim())
}

/// Index of the first data row
fn find_data_start(grid: &[Vec<Data>]) -> usize {
    for (idx, row) in grid.iter().enumerate() {
        let texts: Vec<String> = row.iter().map(|c| cell_text(c).to_lowercase()).collect();

        if texts.iter().any(|t| t.contains(HEADER_TOKEN)) {
            return idx + 1;
        }
        if texts.iter().any(|t| is_study_id(t)) {
            return idx;
        }
    }
    0
}

/// First column (left to right) with at least one study id in the region
fn find_study_column(region: &[Vec<Data>]) -> Option<usize> {
    let width = region.iter().map(Vec::len).max().unwrap_or(0);

    (0..width).find(|&col| {
        region
            .iter()
            .filter_map(|row| row.get(col))
            .any(|cell| is_study_id(&cell_text(cell)))
    })
}

/// Columns holding at least one numeric cell anywhere in the sheet
pub fn numeric_columns(grid: &[Vec<Data>]) -> BTreeSet<usize> {
    let mut cols = BTreeSet::new();
    for row in grid {
        for (col, cell) in row.iter().enumerate() {
            if cell_number(cell).is_some() {
                cols.insert(col);
            }
        }
    }
    cols
}

/// Sum of a row's numeric cells; invalid values count as zero
fn row_hours(row: &[Data], numeric_cols: &BTreeSet<usize>) -> f64 {
    let total: f64 = numeric_cols
        .iter()
        .filter_map(|&col| row.get(col).and_then(cell_number))
        .filter(|v| v.is_finite())
        .sum();

    if total.is_finite() && total > 0.0 {
        total
    } else {
        0.0
    }
}

fn cell_number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Int(i) => Some(*i as f64),
        Data::Float(f) => Some(*f),
        _ => None,
    }
}

/// Stringified, trimmed cell value
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.is_finite() {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => format!("{}", dt),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn s(v: &str) -> Data {
        Data::String(v.to_string())
    }

    fn f(v: f64) -> Data {
        Data::Float(v)
    }

    fn entry(study: &str, hours: f64, sheet: &str) -> SheetEntry {
        SheetEntry {
            study_id: study.to_string(),
            hours,
            sheet: sheet.to_string(),
        }
    }

    #[test]
    fn test_header_row_example() {
        let grid = vec![
            vec![s("Study ID"), s("Jan"), s("Feb")],
            vec![s("STUDY1"), f(3.0), f(4.0)],
            vec![s("STUDY2"), f(0.0), f(0.0)],
            vec![s("junk"), s("x"), s("y")],
        ];

        assert_eq!(
            extract_sheet(&grid, "Week 1"),
            vec![entry("STUDY1", 7.0, "Week 1"), entry("STUDY2", 0.0, "Week 1")]
        );
    }

    #[test]
    fn test_empty_grid() {
        assert!(extract_sheet(&[], "Empty").is_empty());
        assert!(extract_sheet(&[vec![], vec![]], "Blank rows").is_empty());
    }

    #[test]
    fn test_no_study_ids() {
        let grid = vec![
            vec![s("Name"), s("Hours")],
            vec![s("Project A"), f(3.0)],
            vec![s("STUDY"), f(1.0)],
            vec![s("STUDY-4"), f(1.0)],
        ];
        assert!(extract_sheet(&grid, "Sheet1").is_empty());
    }

    #[test]
    fn test_header_with_no_matching_rows() {
        let grid = vec![
            vec![s("Study ID"), s("Mon")],
            vec![s("TBD"), f(3.0)],
        ];
        assert!(extract_sheet(&grid, "Sheet1").is_empty());
    }

    #[test]
    fn test_rows_above_header_are_ignored() {
        let grid = vec![
            vec![s("Timesheet for week 12"), f(99.0)],
            vec![s("Employee"), s("alice"), f(42.0)],
            vec![s("Study ID"), s("Mon"), s("Tue")],
            vec![s("STUDY7"), f(1.5), f(2.5)],
        ];

        assert_eq!(find_data_start(&grid), 3);
        assert_eq!(extract_sheet(&grid, "W12"), vec![entry("STUDY7", 4.0, "W12")]);
    }

    #[test]
    fn test_header_token_inside_longer_text() {
        let grid = vec![
            vec![s("Title")],
            vec![s("Study IDs below")],
            vec![s("STUDY3"), f(2.0)],
        ];
        assert_eq!(find_data_start(&grid), 2);
    }

    #[test]
    fn test_data_starts_at_first_study_row_without_header() {
        let grid = vec![
            vec![s("Week"), f(12.0)],
            vec![Data::Empty, s("STUDY10"), f(2.0), f(1.0)],
            vec![Data::Empty, s("STUDY11"), f(1.0), Data::Empty],
            vec![s("Total"), Data::Empty, f(3.0), f(1.0)],
        ];

        assert_eq!(find_data_start(&grid), 1);
        assert_eq!(
            extract_sheet(&grid, "Week 12"),
            vec![entry("STUDY10", 3.0, "Week 12"), entry("STUDY11", 1.0, "Week 12")]
        );
    }

    #[test]
    fn test_study_ids_are_trimmed_and_uppercased() {
        let grid = vec![
            vec![s("Study ID"), s("Hours")],
            vec![s("  study5 "), f(2.0)],
            vec![s("Study6"), Data::Int(3)],
        ];

        assert_eq!(
            extract_sheet(&grid, "S"),
            vec![entry("STUDY5", 2.0, "S"), entry("STUDY6", 3.0, "S")]
        );
    }

    #[test]
    fn test_numeric_columns_are_sheet_wide() {
        // Column 2 only holds a number on a row outside the data region.
        let grid = vec![
            vec![s("Budget"), Data::Empty, f(100.0)],
            vec![s("Study ID"), s("Mon"), s("Tue")],
            vec![s("STUDY1"), f(1.0), s("n/a")],
            vec![s("STUDY2"), f(2.0), s("3")],
        ];

        assert_eq!(numeric_columns(&grid), BTreeSet::from([1, 2]));
        assert_eq!(
            extract_sheet(&grid, "S"),
            vec![entry("STUDY1", 1.0, "S"), entry("STUDY2", 2.0, "S")]
        );
    }

    #[test]
    fn test_non_numeric_and_invalid_values_count_zero() {
        let grid = vec![
            vec![s("Study ID"), s("A"), s("B"), s("C")],
            vec![s("STUDY1"), f(f64::NAN), Data::Bool(true), f(2.0)],
            vec![s("STUDY2"), f(-5.0), Data::Empty, f(1.0)],
            vec![s("STUDY3"), f(f64::INFINITY), Data::Error(calamine::CellErrorType::Div0), f(1.0)],
        ];

        let entries = extract_sheet(&grid, "S");
        assert_eq!(
            entries,
            vec![
                entry("STUDY1", 2.0, "S"),
                entry("STUDY2", 0.0, "S"),
                entry("STUDY3", 1.0, "S"),
            ]
        );
    }

    #[test]
    fn test_emitted_rows_hold_invariants() {
        let grid = vec![
            vec![s("notes"), s("study id?")],
            vec![s("STUDY1"), f(-3.0), s("abc"), f(1e308), f(1e308)],
            vec![Data::Empty, s("STUDY2")],
            vec![s("study99"), Data::Int(4), f(0.5)],
            vec![s("STUDY 3"), f(8.0)],
        ];

        let entries = extract_sheet(&grid, "Mixed");
        assert!(!entries.is_empty());
        for e in &entries {
            assert!(is_study_id(&e.study_id), "{:?}", e);
            assert!(e.hours >= 0.0 && e.hours.is_finite(), "{:?}", e);
            assert_eq!(e.sheet, "Mixed");
        }
    }

    #[test]
    fn test_first_matching_column_wins() {
        let grid = vec![
            vec![s("Study ID"), s("Alt"), s("Hours")],
            vec![s("x"), s("STUDY9"), f(1.0)],
            vec![s("STUDY1"), s("y"), f(2.0)],
        ];

        assert_eq!(extract_sheet(&grid, "S"), vec![entry("STUDY1", 2.0, "S")]);
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&f(3.0)), "3");
        assert_eq!(cell_text(&f(2.5)), "2.5");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&s("  STUDY1\t")), "STUDY1");
        assert_eq!(cell_text(&Data::Empty), "");
    }
}
