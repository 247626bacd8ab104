//! Summed hours cross-tabulated by two row attributes, zero-filled

use std::collections::BTreeMap;

use super::{AggregatedTable, EffortRow};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pivot {
    /// Row labels, ascending
    pub rows: Vec<String>,
    /// Column labels, ascending
    pub columns: Vec<String>,
    /// `values[row][column]`
    pub values: Vec<Vec<f64>>,
}

impl Pivot {
    /// Sum hours keyed by `(row_key, column_key)`; rows whose key is blank are skipped
    pub fn build<R, C>(table: &AggregatedTable, row_key: R, column_key: C) -> Self
    where
        R: Fn(&EffortRow) -> &str,
        C: Fn(&EffortRow) -> &str,
    {
        let mut cells: BTreeMap<(&str, &str), f64> = BTreeMap::new();
        let mut row_labels: BTreeMap<&str, usize> = BTreeMap::new();
        let mut col_labels: BTreeMap<&str, usize> = BTreeMap::new();

        for row in table.rows() {
            let (r, c) = (row_key(row), column_key(row));
            if r.trim().is_empty() || c.trim().is_empty() {
                continue;
            }
            row_labels.insert(r, 0);
            col_labels.insert(c, 0);
            *cells.entry((r, c)).or_insert(0.0) += row.hours;
        }

        for (idx, slot) in row_labels.values_mut().enumerate() {
            *slot = idx;
        }
        for (idx, slot) in col_labels.values_mut().enumerate() {
            *slot = idx;
        }

        let mut values = vec![vec![0.0; col_labels.len()]; row_labels.len()];
        for ((r, c), hours) in cells {
            values[row_labels[r]][col_labels[c]] = hours;
        }

        Self {
            rows: row_labels.keys().map(|s| s.to_string()).collect(),
            columns: col_labels.keys().map(|s| s.to_string()).collect(),
            values,
        }
    }

    /// Studies as rows, employees as columns
    pub fn study_by_employee(table: &AggregatedTable) -> Self {
        Self::build(table, |r| r.study_id.as_str(), |r| r.employee.as_str())
    }

    /// Employees as rows, studies as columns
    pub fn employee_by_study(table: &AggregatedTable) -> Self {
        Self::build(table, |r| r.employee.as_str(), |r| r.study_id.as_str())
    }

    /// Sheet labels as rows, studies as columns
    pub fn sheet_by_study(table: &AggregatedTable) -> Self {
        Self::build(table, |r| r.sheet.as_str(), |r| r.study_id.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    /// Sum of each row across columns
    pub fn row_totals(&self) -> Vec<f64> {
        self.values.iter().map(|r| r.iter().sum()).collect()
    }

    /// Sum of each column across rows
    pub fn column_totals(&self) -> Vec<f64> {
        (0..self.columns.len())
            .map(|c| self.values.iter().map(|r| r[c]).sum())
            .collect()
    }

    pub fn grand_total(&self) -> f64 {
        self.row_totals().iter().sum()
    }

    pub fn max_value(&self) -> f64 {
        self.values
            .iter()
            .flatten()
            .copied()
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effort::fixtures::{row, two_employees};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_study_by_employee() {
        let pivot = Pivot::study_by_employee(&two_employees());

        assert_eq!(pivot.rows, vec!["STUDY1", "STUDY2"]);
        assert_eq!(pivot.columns, vec!["alice", "bob"]);
        assert_eq!(pivot.values, vec![vec![10.0, 20.0], vec![0.0, 5.0]]);
        assert_eq!(pivot.row_totals(), vec![30.0, 5.0]);
        assert_eq!(pivot.column_totals(), vec![10.0, 25.0]);
        assert_eq!(pivot.grand_total(), 35.0);
        assert_eq!(pivot.max_value(), 20.0);
    }

    #[test]
    fn test_sheet_by_study_skips_blank_sheets() {
        let mut table = two_employees();
        table.push(row("carol", "STUDY3", 8.0, ""));

        let pivot = Pivot::sheet_by_study(&table);
        assert_eq!(pivot.rows, vec!["Week 1", "Week 2"]);
        assert_eq!(pivot.columns, vec!["STUDY1", "STUDY2"]);
        assert_eq!(pivot.values, vec![vec![26.0, 0.0], vec![4.0, 5.0]]);
    }

    #[test]
    fn test_empty_table() {
        let pivot = Pivot::employee_by_study(&AggregatedTable::new());
        assert!(pivot.is_empty());
        assert_eq!(pivot.grand_total(), 0.0);
    }
}
