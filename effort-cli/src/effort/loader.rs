//! Load an employee's workbook into extracted study rows

use anyhow::{Context, Result};
use calamine::{Data, Reader, open_workbook_auto};
use colored::Colorize;
use std::path::Path;

use super::SheetEntry;
use super::extract::extract_sheet;
use crate::config::Config;

/// Rows loaded for one employee
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeLoad {
    pub entries: Vec<SheetEntry>,
    /// Sheets that contributed at least one row
    pub sheet_count: usize,
}

/// Reads employee workbooks from the configured data directory
pub struct EmployeeLoader<'a> {
    config: &'a Config,
}

impl<'a> EmployeeLoader<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Extracted rows for an employee; unreadable or absent files yield none
    pub fn load(&self, employee: &str) -> Vec<SheetEntry> {
        self.load_with_sheet_count(employee).entries
    }

    /// Like [`load`](Self::load), also counting contributing sheets
    pub fn load_with_sheet_count(&self, employee: &str) -> EmployeeLoad {
        let path = self.config.workbook_path(employee);
        if !path.exists() {
            log::debug!("No workbook for {} at {}", employee, path.display());
            return EmployeeLoad::default();
        }

        match self.read_workbook(&path) {
            Ok(load) => load,
            Err(e) => {
                log::warn!("Error reading {}: {:#}", employee, e);
                eprintln!("{} Error reading {}: {:#}", "⚠".yellow(), employee, e);
                EmployeeLoad::default()
            }
        }
    }

    /// Read every non-metadata sheet of a workbook
    pub fn read_workbook(&self, path: &Path) -> Result<EmployeeLoad> {
        let mut workbook = open_workbook_auto(path)
            .with_context(|| format!("Failed to open Excel file: {}", path.display()))?;

        let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
        let mut load = EmployeeLoad::default();

        for sheet_name in sheet_names {
            if self.config.is_metadata_sheet(&sheet_name) {
                log::debug!("Skipping metadata sheet '{}'", sheet_name);
                continue;
            }

            let range = workbook
                .worksheet_range(&sheet_name)
                .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

            let rows: Vec<Vec<Data>> = range.rows().map(|r| r.to_vec()).collect();
            let entries = extract_sheet(&rows, &sheet_name);
            if !entries.is_empty() {
                load.entries.extend(entries);
                load.sheet_count += 1;
            }
        }

        log::info!(
            "Loaded {} rows from {} sheets of {}",
            load.entries.len(),
            load.sheet_count,
            path.display()
        );
        Ok(load)
    }
}
