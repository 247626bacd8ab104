//! Combine every tracked employee's rows into one table

use super::{AggregatedTable, EmployeeLoader};
use crate::config::{Config, Registry, discover_employee_ids};

/// Load all tracked employees that still have a workbook, in ascending id order
///
/// Registry entries without a backing file are skipped here; the startup
/// change check is where they get reported.
pub fn aggregate_all(config: &Config, registry: &Registry) -> AggregatedTable {
    let current = discover_employee_ids(config);
    aggregate_employees(config, &registry.tracked(&current))
}

/// Load the given employees in order, stamping rows with their id
pub fn aggregate_employees(config: &Config, employees: &[String]) -> AggregatedTable {
    let loader = EmployeeLoader::new(config);
    let mut table = AggregatedTable::new();

    for employee in employees {
        table.append_employee(employee, loader.load(employee));
    }

    log::info!(
        "Aggregated {} rows from {} employees",
        table.len(),
        employees.len()
    );
    table
}
