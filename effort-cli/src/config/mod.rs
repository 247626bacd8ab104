//! Runtime configuration and persisted state
//!
//! Configuration is resolved once at startup and passed by reference to every
//! component. Sources, lowest precedence first:
//! - built-in defaults
//! - `effort.toml` in the working directory (all keys optional)
//! - `EFFORT_*` environment variables (a `.env` file is honoured)

pub mod registry;

pub use registry::{Registry, discover_employee_ids};

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Name of the optional config file looked up in the working directory
pub const CONFIG_FILE: &str = "effort.toml";

/// Resolved configuration for a run
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding employee workbooks and report artifacts
    pub data_dir: PathBuf,
    /// Employee workbook extension, including the leading dot
    pub extension: String,
    /// Registry state file (relative paths resolve against `data_dir`)
    pub state_file: PathBuf,
    /// Generic prefix for multi-employee reports, also reserved during discovery
    pub report_prefix: String,
    /// Sheet names the loader skips (compared case-insensitively)
    pub metadata_sheets: BTreeSet<String>,
    /// Output directory for rendered charts (relative paths resolve against `data_dir`)
    pub chart_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            extension: ".xlsx".to_string(),
            state_file: PathBuf::from("known_employees.json"),
            report_prefix: "Effort".to_string(),
            metadata_sheets: ["cover", "summary", "notes", "info"]
                .into_iter()
                .map(String::from)
                .collect(),
            chart_dir: PathBuf::from("charts"),
        }
    }
}

impl Config {
    /// Load configuration from `.env`, `effort.toml` and the process environment
    pub fn load() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("Loaded environment from {}", path.display());
        }

        let mut config = Self::from_file(Path::new(CONFIG_FILE))?;
        config.apply_env(|key| std::env::var(key).ok());
        config.normalize();
        Ok(config)
    }

    /// Read a config file, falling back to defaults when it does not exist
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Apply `EFFORT_*` overrides using the given variable lookup
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("EFFORT_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(file) = lookup("EFFORT_STATE_FILE") {
            self.state_file = PathBuf::from(file);
        }
        if let Some(dir) = lookup("EFFORT_CHART_DIR") {
            self.chart_dir = PathBuf::from(dir);
        }
        if let Some(prefix) = lookup("EFFORT_REPORT_PREFIX") {
            if !prefix.trim().is_empty() {
                self.report_prefix = prefix.trim().to_string();
            }
        }
    }

    /// Canonicalise user-supplied values (extension dot, lowercase sheet names)
    fn normalize(&mut self) {
        if !self.extension.starts_with('.') {
            self.extension = format!(".{}", self.extension);
        }
        self.metadata_sheets = self
            .metadata_sheets
            .iter()
            .map(|s| s.trim().to_lowercase())
            .collect();
    }

    /// Path of the workbook backing an employee
    pub fn workbook_path(&self, employee: &str) -> PathBuf {
        self.data_dir.join(format!("{}{}", employee, self.extension))
    }

    /// Path of the registry state file
    pub fn state_path(&self) -> PathBuf {
        self.resolve(&self.state_file)
    }

    /// Directory charts are rendered into
    pub fn chart_path(&self) -> PathBuf {
        self.resolve(&self.chart_dir)
    }

    /// Whether a sheet should be skipped by the employee loader
    pub fn is_metadata_sheet(&self, sheet_name: &str) -> bool {
        self.metadata_sheets
            .contains(&sheet_name.trim().to_lowercase())
    }

    /// Configuration rooted at a specific directory with otherwise default values
    #[cfg(test)]
    pub fn with_data_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: dir.into(),
            ..Self::default()
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.data_dir, PathBuf::from("."));
        assert_eq!(config.extension, ".xlsx");
        assert_eq!(config.report_prefix, "Effort");
        assert_eq!(config.metadata_sheets.len(), 4);
        assert!(config.is_metadata_sheet("Cover"));
        assert!(config.is_metadata_sheet("NOTES"));
        assert!(!config.is_metadata_sheet("Week 1"));
    }

    #[test]
    fn test_paths_resolve_against_data_dir() {
        let config = Config::with_data_dir("/data/effort");

        assert_eq!(
            config.workbook_path("alice"),
            PathBuf::from("/data/effort/alice.xlsx")
        );
        assert_eq!(
            config.state_path(),
            PathBuf::from("/data/effort/known_employees.json")
        );
        assert_eq!(config.chart_path(), PathBuf::from("/data/effort/charts"));
    }

    #[test]
    fn test_absolute_state_file_is_kept() {
        let mut config = Config::with_data_dir("/data/effort");
        config.state_file = PathBuf::from("/var/lib/effort/state.json");

        assert_eq!(
            config.state_path(),
            PathBuf::from("/var/lib/effort/state.json")
        );
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("EFFORT_DATA_DIR", "/tmp/hours"),
            ("EFFORT_REPORT_PREFIX", "  Team "),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.data_dir, PathBuf::from("/tmp/hours"));
        assert_eq!(config.report_prefix, "Team");
        assert_eq!(config.state_file, PathBuf::from("known_employees.json"));
    }

    #[test]
    fn test_blank_prefix_override_ignored() {
        let mut config = Config::default();
        config.apply_env(|key| (key == "EFFORT_REPORT_PREFIX").then(|| "   ".to_string()));

        assert_eq!(config.report_prefix, "Effort");
    }

    #[test]
    fn test_partial_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            "data_dir = \"sheets\"\nextension = \"xlsm\"\nmetadata_sheets = [\"Cover\", \"Legend\"]\n",
        )
        .unwrap();

        let mut config = Config::from_file(&path).unwrap();
        config.normalize();

        assert_eq!(config.data_dir, PathBuf::from("sheets"));
        assert_eq!(config.extension, ".xlsm");
        assert!(config.is_metadata_sheet("legend"));
        assert!(!config.is_metadata_sheet("notes"));
        assert_eq!(config.report_prefix, "Effort");
    }

    #[test]
    fn test_missing_config_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_file(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_malformed_config_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "data_dir = [").unwrap();

        assert!(Config::from_file(&path).is_err());
    }
}
