//! Effort data: extraction from employee workbooks and the aggregated table
//!
//! Flow: [`loader::EmployeeLoader`] opens a workbook and runs
//! [`extract::extract_sheet`] on each sheet, producing [`SheetEntry`] values.
//! [`aggregate::aggregate_all`] stamps them with the employee id to build an
//! [`AggregatedTable`].

pub mod aggregate;
pub mod extract;
pub mod loader;
pub mod pivot;
pub mod weekday;

pub use aggregate::aggregate_all;
pub use loader::EmployeeLoader;
pub use pivot::Pivot;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One study row extracted from a sheet, before the employee is known
#[derive(Debug, Clone, PartialEq)]
pub struct SheetEntry {
    pub study_id: String,
    pub hours: f64,
    pub sheet: String,
}

/// One normalized (employee, study, hours, sheet) observation
///
/// Field order is the column order of the flat table file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffortRow {
    #[serde(rename = "Employee")]
    pub employee: String,
    #[serde(rename = "Study ID")]
    pub study_id: String,
    #[serde(rename = "Hours")]
    pub hours: f64,
    #[serde(rename = "Sheet", default)]
    pub sheet: String,
}

impl EffortRow {
    pub fn from_entry(employee: &str, entry: SheetEntry) -> Self {
        Self {
            employee: employee.to_string(),
            study_id: entry.study_id,
            hours: entry.hours,
            sheet: entry.sheet,
        }
    }

    /// Whether the row carries a usable sheet label
    pub fn has_sheet(&self) -> bool {
        !self.sheet.trim().is_empty()
    }
}

/// Flat union of every employee's rows for one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedTable {
    rows: Vec<EffortRow>,
}

impl AggregatedTable {
    /// Column names of the flat representation, present even with no rows
    pub const COLUMNS: [&'static str; 4] = ["Employee", "Study ID", "Hours", "Sheet"];

    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<EffortRow>) -> Self {
        Self { rows }
    }

    pub fn push(&mut self, row: EffortRow) {
        self.rows.push(row);
    }

    /// Append an employee's extracted entries, stamping each with the employee id
    pub fn append_employee(&mut self, employee: &str, entries: Vec<SheetEntry>) {
        self.rows
            .extend(entries.into_iter().map(|e| EffortRow::from_entry(employee, e)));
    }

    pub fn rows(&self) -> &[EffortRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total_hours(&self) -> f64 {
        self.rows.iter().map(|r| r.hours).sum()
    }

    /// Whether at least one row has a non-blank sheet label
    pub fn has_sheet_labels(&self) -> bool {
        self.rows.iter().any(EffortRow::has_sheet)
    }

    /// Total hours per study, studies ascending
    pub fn hours_by_study(&self) -> BTreeMap<String, f64> {
        self.sum_by(|r| &r.study_id)
    }

    /// Total hours per employee, employees ascending
    pub fn hours_by_employee(&self) -> BTreeMap<String, f64> {
        self.sum_by(|r| &r.employee)
    }

    /// Total hours per sheet label, blank labels skipped
    pub fn hours_by_sheet(&self) -> BTreeMap<String, f64> {
        let mut totals = BTreeMap::new();
        for row in self.rows.iter().filter(|r| r.has_sheet()) {
            *totals.entry(row.sheet.clone()).or_insert(0.0) += row.hours;
        }
        totals
    }

    /// Rows belonging to any of `employees`
    pub fn filter_employees(&self, employees: &[String]) -> Self {
        self.filter(|row| employees.contains(&row.employee))
    }

    pub fn filter<P>(&self, predicate: P) -> Self
    where
        P: Fn(&EffortRow) -> bool,
    {
        Self {
            rows: self.rows.iter().filter(|r| predicate(r)).cloned().collect(),
        }
    }

    fn sum_by<'a, K>(&'a self, key: K) -> BTreeMap<String, f64>
    where
        K: Fn(&'a EffortRow) -> &'a String,
    {
        let mut totals = BTreeMap::new();
        for row in &self.rows {
            *totals.entry(key(row).clone()).or_insert(0.0) += row.hours;
        }
        totals
    }
}

impl FromIterator<EffortRow> for AggregatedTable {
    fn from_iter<I: IntoIterator<Item = EffortRow>>(iter: I) -> Self {
        Self::from_rows(iter.into_iter().collect())
    }
}
