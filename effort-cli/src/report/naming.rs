//! Report artifact file names
//!
//! A report run produces `<Prefix>Files_<ts>.xlsx` and `<Prefix>Data_<ts>.csv`
//! where `<ts>` is `YYYYMMDD_HHMMSS`.

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

static REPORT_WORKBOOK_STEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Files_\d{8}_\d{6}$").unwrap());

static DATA_FILE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*)Data_(\d{8}_\d{6})\.csv$").unwrap());

/// File names for one report run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNames {
    pub prefix: String,
    pub workbook: String,
    pub data: String,
}

impl ArtifactNames {
    pub fn new(prefix: &str, generated_at: &NaiveDateTime) -> Self {
        let stamp = generated_at.format(TIMESTAMP_FORMAT).to_string();
        Self {
            prefix: prefix.to_string(),
            workbook: format!("{}Files_{}.xlsx", prefix, stamp),
            data: format!("{}Data_{}.csv", prefix, stamp),
        }
    }
}

/// Prefix for a report over `selected`: the sole employee, otherwise the generic prefix
pub fn artifact_prefix(selected: &[String], generic: &str) -> String {
    match selected {
        [only] => only.clone(),
        _ => generic.to_string(),
    }
}

/// Whether a workbook stem looks like a generated report workbook
pub fn is_report_workbook_stem(stem: &str) -> bool {
    REPORT_WORKBOOK_STEM.is_match(stem)
}

/// Split a flat table file name into `(prefix, timestamp)`
pub fn parse_data_file_name(name: &str) -> Option<(&str, &str)> {
    let caps = DATA_FILE_NAME.captures(name)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn stamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(9, 5, 1)
            .unwrap()
    }

    #[test]
    fn test_single_employee_prefix() {
        let selected = vec!["alice".to_string()];
        let names = ArtifactNames::new(&artifact_prefix(&selected, "Effort"), &stamp());

        assert_eq!(names.workbook, "aliceFiles_20240307_090501.xlsx");
        assert_eq!(names.data, "aliceData_20240307_090501.csv");
    }

    #[test]
    fn test_multi_employee_prefix() {
        let selected = vec!["alice".to_string(), "bob".to_string()];
        let names = ArtifactNames::new(&artifact_prefix(&selected, "Effort"), &stamp());

        assert_eq!(names.workbook, "EffortFiles_20240307_090501.xlsx");
        assert_eq!(names.data, "EffortData_20240307_090501.csv");
    }

    #[test]
    fn test_report_workbook_stem() {
        assert!(is_report_workbook_stem("aliceFiles_20240307_090501"));
        assert!(is_report_workbook_stem("EffortFiles_20240307_090501"));
        assert!(!is_report_workbook_stem("alice"));
        assert!(!is_report_workbook_stem("Files_2024"));
    }

    #[test]
    fn test_parse_data_file_name() {
        assert_eq!(
            parse_data_file_name("EffortData_20240307_090501.csv"),
            Some(("Effort", "20240307_090501"))
        );
        assert_eq!(
            parse_data_file_name("aliceData_20240307_090501.csv"),
            Some(("alice", "20240307_090501"))
        );
        assert_eq!(parse_data_file_name("EffortData_latest.csv"), None);
        assert_eq!(parse_data_file_name("alice.xlsx"), None);
    }
}
