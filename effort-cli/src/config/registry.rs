//! Persisted registry of tracked employees
//!
//! The registry is a flat JSON document `{ "employees": [...] }` kept sorted
//! and rewritten wholesale on every save. A missing or unreadable file is an
//! empty registry.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::Config;
use crate::report::naming::is_report_workbook_stem;

/// On-disk shape of the registry file
#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    employees: Vec<String>,
}

/// Set of employee identifiers the tool tracks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    employees: BTreeSet<String>,
}

/// Difference between the registry and the files currently on disk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryDiff {
    /// Files present on disk but not tracked
    pub new: BTreeSet<String>,
    /// Tracked employees whose file is gone
    pub missing: BTreeSet<String>,
}

impl RegistryDiff {
    pub fn is_empty(&self) -> bool {
        self.new.is_empty() && self.missing.is_empty()
    }
}

impl Registry {
    pub fn new<I, S>(employees: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            employees: employees.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether a registry file has ever been written
    pub fn exists(config: &Config) -> bool {
        config.state_path().exists()
    }

    /// Load the registry; absent or malformed state yields an empty registry
    pub fn load(config: &Config) -> Self {
        let path = config.state_path();
        if !path.exists() {
            return Self::default();
        }

        let parsed = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read registry: {}", path.display()))
            .and_then(|content| {
                serde_json::from_str::<RegistryFile>(&content)
                    .with_context(|| format!("Malformed registry: {}", path.display()))
            });

        match parsed {
            Ok(file) => Self::new(file.employees),
            Err(e) => {
                log::warn!("{:#}; starting with an empty registry", e);
                Self::default()
            }
        }
    }

    /// Overwrite the registry file with the current set, sorted ascending
    pub fn save(&self, config: &Config) -> Result<()> {
        let path = config.state_path();
        let file = RegistryFile {
            employees: self.employees.iter().cloned().collect(),
        };
        let json = serde_json::to_string_pretty(&file).context("Failed to serialize registry")?;

        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write registry: {}", path.display()))?;

        log::info!("Saved {} employees to {}", self.len(), path.display());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.employees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }

    pub fn remove(&mut self, employee: &str) -> bool {
        self.employees.remove(employee)
    }

    pub fn extend<I>(&mut self, employees: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.employees.extend(employees);
    }

    /// Drop every tracked employee in `gone`
    pub fn remove_all(&mut self, gone: &BTreeSet<String>) {
        self.employees.retain(|e| !gone.contains(e));
    }

    /// Compare against the identifiers derivable from files on disk
    pub fn diff(&self, current: &BTreeSet<String>) -> RegistryDiff {
        RegistryDiff {
            new: current.difference(&self.employees).cloned().collect(),
            missing: self.employees.difference(current).cloned().collect(),
        }
    }

    /// Tracked employees that still have a backing file, ascending
    pub fn tracked(&self, current: &BTreeSet<String>) -> Vec<String> {
        self.employees.intersection(current).cloned().collect()
    }
}

/// Employee identifiers derivable from workbooks in the data directory
///
/// Report workbooks (names starting with the report prefix, or shaped like
/// `<prefix>Files_<timestamp>`) are never employees.
pub fn discover_employee_ids(config: &Config) -> BTreeSet<String> {
    let entries = match std::fs::read_dir(&config.data_dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::debug!("Cannot list {}: {}", config.data_dir.display(), e);
            return BTreeSet::new();
        }
    };

    let extension = config.extension.to_lowercase();
    let reserved = config.report_prefix.to_lowercase();

    entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter_map(|name| {
            let lower = name.to_lowercase();
            if !lower.ends_with(&extension) || lower.starts_with(&reserved) {
                return None;
            }
            let stem = name.get(..name.len().checked_sub(extension.len())?)?;
            if stem.is_empty() || is_report_workbook_stem(stem) {
                return None;
            }
            Some(stem.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn setup() -> (tempfile::TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_data_dir(dir.path());
        (dir, config)
    }

    #[test]
    fn test_missing_file_is_empty() {
        let (_dir, config) = setup();
        assert!(!Registry::exists(&config));
        assert!(Registry::load(&config).is_empty());
    }

    #[test]
    fn test_malformed_file_is_empty() {
        let (_dir, config) = setup();
        fs::write(config.state_path(), "{ not json").unwrap();
        assert!(Registry::load(&config).is_empty());

        fs::write(config.state_path(), "[\"alice\"]").unwrap();
        assert!(Registry::load(&config).is_empty());
    }

    #[test]
    fn test_round_trip_sorted() {
        let (_dir, config) = setup();
        let registry = Registry::new(["carol", "alice", "bob", "alice"]);
        registry.save(&config).unwrap();

        let content = fs::read_to_string(config.state_path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value, serde_json::json!({ "employees": ["alice", "bob", "carol"] }));

        let loaded = Registry::load(&config);
        assert_eq!(loaded, registry);
        assert_eq!(loaded.len(), 3);
    }

    #[test]
    fn test_missing_employees_key_is_empty() {
        let (_dir, config) = setup();
        fs::write(config.state_path(), "{}").unwrap();
        assert!(Registry::load(&config).is_empty());
    }

    #[test]
    fn test_diff_and_tracked() {
        let registry = Registry::new(["alice", "bob", "dave"]);
        let current: BTreeSet<String> = ["alice", "bob", "carol"]
            .into_iter()
            .map(String::from)
            .collect();

        let diff = registry.diff(&current);
        assert_eq!(diff.new.into_iter().collect::<Vec<_>>(), vec!["carol"]);
        assert_eq!(diff.missing.into_iter().collect::<Vec<_>>(), vec!["dave"]);
        assert_eq!(registry.tracked(&current), vec!["alice", "bob"]);
    }

    #[test]
    fn test_mutations() {
        let mut registry = Registry::new(["alice"]);
        registry.extend(vec!["alice".to_string(), "bob".to_string(), "carol".to_string()]);
        assert_eq!(registry.len(), 3);

        assert!(registry.remove("bob"));
        assert!(!registry.remove("bob"));

        let gone: BTreeSet<String> = ["carol".to_string()].into_iter().collect();
        registry.remove_all(&gone);
        assert_eq!(registry, Registry::new(["alice"]));
    }

    #[test]
    fn test_discover_employee_ids() {
        let (dir, config) = setup();
        for name in [
            "alice.xlsx",
            "BOB.XLSX",
            "notes.txt",
            "EffortFiles_20240101_120000.xlsx",
            "effort_summary.xlsx",
            "aliceFiles_20240101_120000.xlsx",
            "EffortData_20240101_120000.csv",
        ] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("folder.xlsx")).unwrap();

        let ids = discover_employee_ids(&config);
        assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec!["BOB", "alice"]);
    }

    #[test]
    fn test_discover_missing_dir() {
        let config = Config::with_data_dir("/definitely/not/here");
        assert!(discover_employee_ids(&config).is_empty());
    }
}
