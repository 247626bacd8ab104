//! Per-employee study summaries

use std::collections::BTreeMap;

use crate::effort::SheetEntry;

/// What an employee's report sheet shows
#[derive(Debug, Clone, PartialEq)]
pub enum EmployeeSummary {
    /// File missing, unreadable, or no study rows
    NoData,
    /// Study rows exist but every one has zero hours
    NoHours,
    Studies {
        /// `(study, hours)`, studies ascending
        studies: Vec<(String, f64)>,
        total: f64,
    },
}

impl EmployeeSummary {
    pub fn from_entries(entries: &[SheetEntry]) -> Self {
        if entries.is_empty() {
            return Self::NoData;
        }

        let mut by_study: BTreeMap<&str, f64> = BTreeMap::new();
        for entry in entries {
            *by_study.entry(entry.study_id.as_str()).or_insert(0.0) += entry.hours;
        }

        let total: f64 = by_study.values().sum();
        if total == 0.0 {
            return Self::NoHours;
        }

        Self::Studies {
            studies: by_study
                .into_iter()
                .map(|(study, hours)| (study.to_string(), hours))
                .collect(),
            total,
        }
    }

    /// Placeholder text for sheets without a summary table
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            Self::NoData => Some("No data found or file unreadable"),
            Self::NoHours => Some("No hours recorded"),
            Self::Studies { .. } => None,
        }
    }
}

/// Share of `total` as a percentage string with two decimals, e.g. `"33.33%"`
pub fn format_percent(hours: f64, total: f64) -> String {
    if total == 0.0 {
        return "0.00%".to_string();
    }
    let pct = (hours / total * 100.0 * 100.0).round() / 100.0;
    format!("{:.2}%", pct)
}
