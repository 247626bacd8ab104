//! Flat CSV companion of a report, reloaded for charts without re-parsing workbooks

use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use std::path::{Path, PathBuf};

use super::naming::parse_data_file_name;
use crate::config::Config;
use crate::effort::{AggregatedTable, EffortRow};

/// Write every detail row as `Employee, Study ID, Hours, Sheet`
pub fn write_flat_table(table: &AggregatedTable, path: &Path) -> Result<()> {
    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;

    wtr.write_record(AggregatedTable::COLUMNS)
        .context("Failed to write CSV header")?;

    for row in table.rows() {
        wtr.serialize(row)
            .with_context(|| format!("Failed to write row for {}", row.employee))?;
    }

    wtr.flush().context("Failed to flush CSV writer")?;

    log::info!("CSV file exported to: {}", path.display());
    Ok(())
}

/// Read a flat table back into memory
pub fn read_flat_table(path: &Path) -> Result<AggregatedTable> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

    let mut table = AggregatedTable::new();
    for (idx, record) in rdr.deserialize::<EffortRow>().enumerate() {
        let row = record.with_context(|| format!("{}: bad row {}", path.display(), idx + 2))?;
        table.push(row);
    }

    log::info!("Read {} rows from {}", table.len(), path.display());
    Ok(table)
}

/// Most recent flat table in the data directory (greatest timestamp, then name)
pub fn latest_data_file(config: &Config) -> Option<PathBuf> {
    let entries = std::fs::read_dir(&config.data_dir).ok()?;

    entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter_map(|name| {
            let (_, stamp) = parse_data_file_name(&name)?;
            Some((stamp.to_string(), name))
        })
        .max()
        .map(|(_, name)| config.data_dir.join(name))
}
