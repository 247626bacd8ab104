//! Write report workbooks
//!
//! One sheet per employee (`Account | Hours | Total Hours | %`) and, for
//! multi-employee reports, an "Overall Summary" pivot.

use anyhow::{Context, Result};
use rust_xlsxwriter::{Color, Format, Workbook, Worksheet};
use std::collections::HashSet;
use std::path::Path;

use super::summary::{EmployeeSummary, format_percent};
use crate::effort::Pivot;

pub const OVERALL_SUMMARY_SHEET: &str = "Overall Summary";
pub const GRAND_TOTAL: &str = "Grand Total";
pub const TOTAL_PER_EMPLOYEE: &str = "Total per Employee";

/// Longest sheet name Excel accepts
const MAX_SHEET_NAME: usize = 31;

/// Column indices for employee sheets
mod cols {
    pub const ACCOUNT: u16 = 0;
    pub const HOURS: u16 = 1;
    pub const TOTAL_HOURS: u16 = 2;
    pub const PERCENT: u16 = 3;
}

/// Report workbook under construction
pub struct ReportWorkbook {
    workbook: Workbook,
    sheet_names: SheetNamer,
    header_format: Format,
    total_format: Format,
}

impl ReportWorkbook {
    pub fn new() -> Self {
        Self {
            workbook: Workbook::new(),
            sheet_names: SheetNamer::default(),
            header_format: Format::new()
                .set_bold()
                .set_background_color(Color::RGB(0x4472C4))
                .set_font_color(Color::White),
            total_format: Format::new()
                .set_bold()
                .set_background_color(Color::RGB(0xE7E6E6)),
        }
    }

    /// Add an employee's summary sheet, or a placeholder sheet when there is nothing to show
    pub fn add_employee_sheet(&mut self, employee: &str, summary: &EmployeeSummary) -> Result<()> {
        let name = self.sheet_names.claim(employee);
        let sheet = self.workbook.add_worksheet();
        sheet
            .set_name(&name)
            .with_context(|| format!("Invalid sheet name '{}'", name))?;

        if let Some(text) = summary.placeholder() {
            sheet.write_string(0, 0, text)?;
            return Ok(());
        }

        let EmployeeSummary::Studies { studies, total } = summary else {
            return Ok(());
        };

        write_employee_header(sheet, &self.header_format)?;
        for (idx, (study, hours)) in studies.iter().enumerate() {
            let row = (idx + 1) as u32;
            sheet.write_string(row, cols::ACCOUNT, study)?;
            sheet.write_number(row, cols::HOURS, *hours)?;
            sheet.write_number(row, cols::TOTAL_HOURS, *total)?;
            sheet.write_string(row, cols::PERCENT, format_percent(*hours, *total))?;
        }

        sheet.set_column_width(cols::ACCOUNT, 16)?;
        sheet.set_column_width(cols::TOTAL_HOURS, 12)?;
        Ok(())
    }

    /// Add the studies x employees pivot with row and column totals
    pub fn add_overall_summary(&mut self, pivot: &Pivot) -> Result<()> {
        let name = self.sheet_names.claim(OVERALL_SUMMARY_SHEET);
        let sheet = self.workbook.add_worksheet();
        sheet.set_name(&name)?;

        let grand_col = (pivot.columns.len() + 1) as u16;

        sheet.write_string_with_format(0, 0, "Account", &self.header_format)?;
        for (idx, employee) in pivot.columns.iter().enumerate() {
            sheet.write_string_with_format(0, (idx + 1) as u16, employee, &self.header_format)?;
        }
        sheet.write_string_with_format(0, grand_col, GRAND_TOTAL, &self.header_format)?;

        let row_totals = pivot.row_totals();
        for (r, study) in pivot.rows.iter().enumerate() {
            let row = (r + 1) as u32;
            sheet.write_string(row, 0, study)?;
            for (c, hours) in pivot.values[r].iter().enumerate() {
                sheet.write_number(row, (c + 1) as u16, *hours)?;
            }
            sheet.write_number(row, grand_col, row_totals[r])?;
        }

        let total_row = (pivot.rows.len() + 1) as u32;
        sheet.write_string_with_format(total_row, 0, TOTAL_PER_EMPLOYEE, &self.total_format)?;
        for (c, hours) in pivot.column_totals().iter().enumerate() {
            sheet.write_number_with_format(total_row, (c + 1) as u16, *hours, &self.total_format)?;
        }
        sheet.write_number_with_format(
            total_row,
            grand_col,
            pivot.grand_total(),
            &self.total_format,
        )?;

        sheet.set_column_width(0, 20)?;
        Ok(())
    }

    pub fn save(mut self, path: &Path) -> Result<()> {
        self.workbook
            .save(path)
            .with_context(|| format!("Failed to save Excel file: {}", path.display()))?;
        Ok(())
    }
}

impl Default for ReportWorkbook {
    fn default() -> Self {
        Self::new()
    }
}

fn write_employee_header(ws: &mut Worksheet, format: &Format) -> Result<()> {
    ws.write_string_with_format(0, cols::ACCOUNT, "Account", format)?;
    ws.write_string_with_format(0, cols::HOURS, "Hours", format)?;
    ws.write_string_with_format(0, cols::TOTAL_HOURS, "Total Hours", format)?;
    ws.write_string_with_format(0, cols::PERCENT, "%", format)?;
    Ok(())
}

/// Hands out valid, unique sheet names
///
/// Excel compares sheet names case-insensitively, caps them at 31 characters
/// and rejects `[ ] : * ? / \`.
#[derive(Debug, Default)]
pub struct SheetNamer {
    taken: HashSet<String>,
}

impl SheetNamer {
    pub fn claim(&mut self, wanted: &str) -> String {
        let base = sanitize_sheet_name(wanted);

        let mut candidate = base.clone();
        let mut n = 2;
        while self.taken.contains(&candidate.to_lowercase()) {
            let suffix = format!(" ({})", n);
            let keep = MAX_SHEET_NAME - suffix.chars().count();
            candidate = format!("{}{}", base.chars().take(keep).collect::<String>(), suffix);
            n += 1;
        }

        self.taken.insert(candidate.to_lowercase());
        candidate
    }
}

pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            c => c,
        })
        .collect();

    let truncated: String = cleaned
        .trim_matches('\'')
        .chars()
        .take(MAX_SHEET_NAME)
        .collect();
    let truncated = truncated.trim_end_matches('\'').to_string();

    if truncated.trim().is_empty() {
        "Sheet".to_string()
    } else {
        truncated
    }
}
