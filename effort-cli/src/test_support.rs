//! Fixture workbooks for tests

use rust_xlsxwriter::Workbook;
use std::path::Path;

use crate::config::Config;

#[derive(Debug, Clone, Copy)]
pub enum Cell<'a> {
    S(&'a str),
    N(f64),
    Blank,
}

/// Write a workbook with the given sheets of cell rows
pub fn write_workbook(path: &Path, sheets: &[(&str, Vec<Vec<Cell>>)]) {
    let mut workbook = Workbook::new();
    for (name, rows) in sheets {
        let sheet = workbook.add_worksheet();
        sheet.set_name(*name).unwrap();
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                match cell {
                    Cell::S(v) => {
                        sheet.write_string(r as u32, c as u16, *v).unwrap();
                    }
                    Cell::N(v) => {
                        sheet.write_number(r as u32, c as u16, *v).unwrap();
                    }
                    Cell::Blank => {}
                }
            }
        }
    }
    workbook.save(path).unwrap();
}

/// Employee workbook with one weekly sheet per `(sheet, [(study, hours)])`
pub fn write_employee(config: &Config, employee: &str, weeks: &[(&str, &[(&str, f64)])]) {
    let sheets: Vec<(&str, Vec<Vec<Cell>>)> = weeks
        .iter()
        .map(|(sheet, studies)| {
            let mut rows = vec![vec![Cell::S("Study ID"), Cell::S("Hours")]];
            rows.extend(
                studies
                    .iter()
                    .map(|(study, hours)| vec![Cell::S(study), Cell::N(*hours)]),
            );
            (*sheet, rows)
        })
        .collect();
    write_workbook(&config.workbook_path(employee), &sheets);
}

/// Temporary data directory with a config rooted in it
pub fn temp_config() -> (tempfile::TempDir, Config) {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::with_data_dir(dir.path());
    (dir, config)
}
