//! Report generation: Excel summary workbook plus flat CSV companion

pub mod flat_table;
pub mod naming;
pub mod summary;
pub mod writer;

pub use flat_table::{latest_data_file, read_flat_table, write_flat_table};
pub use summary::EmployeeSummary;

use anyhow::{Result, ensure};
use chrono::{Local, NaiveDateTime};
use std::path::PathBuf;

use crate::config::Config;
use crate::effort::{AggregatedTable, EmployeeLoader, Pivot};
use naming::{ArtifactNames, artifact_prefix};
use writer::ReportWorkbook;

/// Files written by one report run
#[derive(Debug, Clone, PartialEq)]
pub struct ReportArtifact {
    pub workbook_path: PathBuf,
    /// Absent when no selected employee had any rows
    pub data_path: Option<PathBuf>,
    pub employees_with_data: usize,
    pub has_overall_summary: bool,
}

pub struct ReportGenerator<'a> {
    config: &'a Config,
}

impl<'a> ReportGenerator<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Generate a report for `selected`, stamped with the current local time
    pub fn generate(&self, selected: &[String]) -> Result<ReportArtifact> {
        self.generate_at(selected, Local::now().naive_local())
    }

    pub fn generate_at(
        &self,
        selected: &[String],
        generated_at: NaiveDateTime,
    ) -> Result<ReportArtifact> {
        ensure!(!selected.is_empty(), "No employees selected");

        let prefix = artifact_prefix(selected, &self.config.report_prefix);
        let names = ArtifactNames::new(&prefix, &generated_at);
        log::info!(
            "Generating report '{}' for {} employees",
            names.prefix,
            selected.len()
        );

        let loader = EmployeeLoader::new(self.config);
        let mut report = ReportWorkbook::new();
        let mut details = AggregatedTable::new();
        let mut employees_with_data = 0;

        for employee in selected {
            let entries = loader.load(employee);
            report.add_employee_sheet(employee, &EmployeeSummary::from_entries(&entries))?;

            if !entries.is_empty() {
                employees_with_data += 1;
                details.append_employee(employee, entries);
            }
        }

        let has_overall_summary = selected.len() > 1 && !details.is_empty();
        if has_overall_summary {
            report.add_overall_summary(&Pivot::study_by_employee(&details))?;
        }

        let workbook_path = self.config.data_dir.join(&names.workbook);
        report.save(&workbook_path)?;
        log::info!("Excel file exported to: {}", workbook_path.display());

        let data_path = if details.is_empty() {
            None
        } else {
            let path = self.config.data_dir.join(&names.data);
            write_flat_table(&details, &path)?;
            Some(path)
        };

        Ok(ReportArtifact {
            workbook_path,
            data_path,
            employees_with_data,
            has_overall_summary,
        })
    }
}
