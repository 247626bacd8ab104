//! Interactive menu shell
//!
//! Every operation returns to the menu it was started from. Failures inside
//! an operation are reported and never end the loop; only a broken console
//! (closed stdin) does.

pub mod prompt;

use anyhow::Result;
use colored::*;

use crate::charts::{ChartError, ChartKind, ChartRenderer, open_in_viewer};
use crate::config::{Config, Registry, discover_employee_ids};
use crate::effort::weekday::{weekday_from_index, weekday_name};
use crate::effort::{AggregatedTable, EmployeeLoader, aggregate_all};
use crate::report::{ReportGenerator, latest_data_file, read_flat_table};
use prompt::{
    ask, confirm, failure, parse_choice, parse_selection, pause, print_numbered, success, warning,
};

pub struct Shell<'a> {
    config: &'a Config,
    registry: Registry,
}

impl<'a> Shell<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            registry: Registry::load(config),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        self.first_run()?;
        self.check_for_changes()?;

        loop {
            self.print_main_menu();

            let outcome = match parse_choice(&ask("Choose (0-4)")?, 4) {
                Some(0) => {
                    println!("\n{}\n", "Goodbye!".bright_green());
                    return Ok(());
                }
                Some(1) => self.remove_employee(),
                Some(2) => self.generate_report(),
                Some(3) => self.visualisation_menu(),
                Some(4) => self.advanced_mode(),
                _ => {
                    warning("Invalid option! Try again.");
                    Ok(())
                }
            };

            if let Err(e) = outcome {
                log::error!("Menu operation failed: {:#}", e);
                failure(&format!("{:#}", e));
            }
        }
    }

    /// Tracked employees that still have a workbook, ascending
    fn employees(&self) -> Vec<String> {
        if self.registry.is_empty() {
            return Vec::new();
        }
        self.registry.tracked(&discover_employee_ids(self.config))
    }

    fn print_main_menu(&self) {
        let employees = self.employees();
        let active = if employees.is_empty() {
            "None yet".dimmed().to_string()
        } else {
            employees.join(", ")
        };

        println!("\n{}", "=".repeat(60).bright_blue());
        println!(" {}", "EFFORT HOURS ANALYSIS".bright_cyan().bold());
        println!("{}", "=".repeat(60).bright_blue());
        println!("Active employees: {} → {}", employees.len(), active);
        println!("\n{}", "MAIN MENU".bold());
        println!("1. Remove employee");
        println!("2. Generate Excel report");
        println!("3. Visualisations");
        println!("4. Advanced mode");
        println!("0. Exit");
        println!("{}", "-".repeat(60));
    }

    fn first_run(&mut self) -> Result<()> {
        if Registry::exists(self.config) {
            return Ok(());
        }
        let current = discover_employee_ids(self.config);
        if current.is_empty() {
            return Ok(());
        }

        println!("\n{}", "First run detected!".bright_green().bold());
        println!("Found {} employee files:", current.len());
        let files: Vec<String> = current
            .iter()
            .map(|e| format!("{}{}", e, self.config.extension))
            .collect();
        print_numbered(&files);

        if confirm("Add all automatically?", true)? {
            let mut updated = self.registry.clone();
            updated.extend(current);
            self.commit(updated, "Added all employees!");
        }
        pause()
    }

    /// Persist `updated` and adopt it; on failure the current registry stays in effect
    fn commit(&mut self, updated: Registry, done: &str) -> bool {
        match updated.save(self.config) {
            Ok(()) => {
                self.registry = updated;
                success(done);
                true
            }
            Err(e) => {
                log::error!("Registry not saved: {:#}", e);
                failure(&format!("{:#}", e));
                false
            }
        }
    }

    /// Offer to track new workbooks and to forget employees whose workbook is gone
    fn check_for_changes(&mut self) -> Result<()> {
        let diff = self.registry.diff(&discover_employee_ids(self.config));
        if diff.is_empty() {
            return Ok(());
        }

        if !diff.new.is_empty() {
            println!("\n{} {}", "New files found:".bright_green(), join(&diff.new));
            if confirm("Add them?", false)? {
                let mut updated = self.registry.clone();
                updated.extend(diff.new.iter().cloned());
                self.commit(updated, "Added!");
            }
        }

        if !diff.missing.is_empty() {
            println!("\n{} {}", "Missing files:".yellow(), join(&diff.missing));
            if confirm("Remove from tracking?", false)? {
                let mut updated = self.registry.clone();
                updated.remove_all(&diff.missing);
                self.commit(updated, "Removed.");
            }
        }

        pause()
    }

    fn remove_employee(&mut self) -> Result<()> {
        let employees = self.employees();
        if employees.is_empty() {
            warning("No employees to remove.");
            return pause();
        }

        println!("\n{}", "Remove Employee".bold());
        print_numbered(&employees);

        match ask("Enter number (0 to cancel)")?.parse::<usize>() {
            Ok(0) => return Ok(()),
            Ok(n) if n <= employees.len() => {
                let employee = &employees[n - 1];
                if confirm(&format!("Remove {}?", employee), false)? {
                    let mut updated = self.registry.clone();
                    updated.remove(employee);
                    self.commit(updated, "Removed.");
                }
            }
            Ok(_) => warning("Invalid number."),
            Err(_) => warning("Invalid input."),
        }
        pause()
    }

    fn generate_report(&self) -> Result<()> {
        let employees = self.employees();
        if employees.is_empty() {
            warning("No tracked employees!");
            return pause();
        }

        println!("\n{}", "Generate Report".bold());
        println!("1. All employees");
        println!("2. Selected employees");

        let selected = match parse_choice(&ask("Choose (1 or 2)")?, 2) {
            Some(1) => employees,
            Some(2) => match select_employees(&employees, "Numbers")? {
                Some(selected) => selected,
                None => return pause(),
            },
            _ => {
                warning("Invalid choice.");
                return pause();
            }
        };

        match ReportGenerator::new(self.config).generate(&selected) {
            Ok(artifact) => {
                success(&format!(
                    "Excel report saved: {}",
                    artifact.workbook_path.display()
                ));
                if artifact.has_overall_summary {
                    println!("Overall Summary sheet included");
                }
                match &artifact.data_path {
                    Some(path) => success(&format!("CSV saved: {}", path.display())),
                    None => warning("No data rows found, CSV not written"),
                }
                println!(
                    "{} of {} employees had data",
                    artifact.employees_with_data,
                    selected.len()
                );
            }
            Err(e) => {
                log::error!("Report generation failed: {:#}", e);
                failure(&format!("Report generation failed: {:#}", e));
            }
        }
        pause()
    }

    /// Whether a flat table exists, offering to generate a report when none does
    fn ensure_report_exists(&self) -> Result<bool> {
        if latest_data_file(self.config).is_some() {
            return Ok(true);
        }

        warning("No report found for visualisation.");
        if confirm("Do you want to generate a report first?", false)? {
            self.generate_report()?;
            return Ok(latest_data_file(self.config).is_some());
        }
        Ok(false)
    }

    fn latest_report_table(&self) -> Result<Option<AggregatedTable>> {
        latest_data_file(self.config)
            .map(|path| read_flat_table(&path))
            .transpose()
    }

    fn visualisation_menu(&self) -> Result<()> {
        if !self.ensure_report_exists()? {
            return Ok(());
        }
        let Some(table) = self.latest_report_table()? else {
            return Ok(());
        };

        loop {
            println!("\n{}", "VISUALISATION MENU".bright_magenta().bold());
            print_chart_menu();
            println!("0. Back");
            println!("{}", "-".repeat(50));

            match parse_choice(&ask("Choose (0-12)")?, ChartKind::ALL.len()) {
                Some(0) => return Ok(()),
                Some(n) => {
                    if let Some(kind) = ChartKind::from_menu_choice(n) {
                        self.show_chart(kind, &table, "")?;
                    }
                }
                None => warning("Invalid choice!"),
            }
        }
    }

    fn show_chart(&self, kind: ChartKind, table: &AggregatedTable, suffix: &str) -> Result<()> {
        match ChartRenderer::new(self.config).render(kind, table, suffix) {
            Ok(figure) => {
                log::debug!("Rendered {:?} with {} rows", figure.kind, table.len());
                success(&format!("{} saved: {}", figure.title, figure.path.display()));
                if let Err(e) = open_in_viewer(&figure.path) {
                    log::warn!("{:#}", e);
                    println!("Open it manually: {}", figure.path.display());
                }
                Ok(())
            }
            Err(ChartError::NoData(e)) => {
                warning(&e.to_string());
                pause()
            }
            Err(e) => {
                log::error!("{} failed: {}", kind.title(), e);
                failure(&e.to_string());
                pause()
            }
        }
    }

    fn advanced_mode(&self) -> Result<()> {
        let employees = self.employees();
        if employees.is_empty() {
            warning("No employees tracked.");
            return pause();
        }

        loop {
            println!("\n{}", "ADVANCED MODE".bright_yellow().bold());
            println!("1. Employee sheet count");
            println!("2. Generate report (custom)");
            println!("3. Visualise single employee");
            println!("4. Visualise selected employees");
            println!("5. Filter by day of week");
            println!("0. Back");
            println!("{}", "-".repeat(40));

            match parse_choice(&ask("Choose")?, 5) {
                Some(0) => return Ok(()),
                Some(1) => self.sheet_counts(&employees),
                Some(2) => {
                    self.generate_report()?;
                    continue;
                }
                Some(3) => self.visualise_employees(&employees, true)?,
                Some(4) => self.visualise_employees(&employees, false)?,
                Some(5) => self.weekday_filter()?,
                _ => warning("Invalid choice."),
            }
            pause()?;
        }
    }

    fn sheet_counts(&self, employees: &[String]) {
        println!("\n{}", "Sheet count per employee:".bold());
        let loader = EmployeeLoader::new(self.config);
        for employee in employees {
            let load = loader.load_with_sheet_count(employee);
            println!(" {}: {} sheets", employee, load.sheet_count);
        }
    }

    /// Chart a subset of employees, from the latest flat table or a live aggregation
    fn visualise_employees(&self, employees: &[String], single: bool) -> Result<()> {
        let table = if self.ensure_report_exists()? {
            self.latest_report_table()?.unwrap_or_default()
        } else {
            aggregate_all(self.config, &self.registry)
        };
        if table.is_empty() {
            warning("No data available.");
            return Ok(());
        }

        let selection = if single {
            select_employees(employees, "Number")?.map(|mut s| {
                s.truncate(1);
                s
            })
        } else {
            select_employees(employees, "Numbers (space-separated)")?
        };
        let Some(selected) = selection else {
            return Ok(());
        };

        let filtered = table.filter_employees(&selected);
        if filtered.is_empty() {
            warning("No data for selected employees.");
            return Ok(());
        }

        println!("\nChoose visualisation:");
        print_chart_menu();
        let Some(kind) =
            parse_choice(&ask("Choose (1-12)")?, ChartKind::ALL.len()).and_then(ChartKind::from_menu_choice)
        else {
            warning("Invalid choice.");
            return Ok(());
        };

        self.show_chart(kind, &filtered, &format!(" ({})", selected.join(", ")))
    }

    fn weekday_filter(&self) -> Result<()> {
        if !self.ensure_report_exists()? {
            return Ok(());
        }

        println!("\nDays: 0=Monday ... 6=Sunday");
        let Some(day) = ask("Enter day number (0-6)")?
            .parse::<u32>()
            .ok()
            .and_then(weekday_from_index)
        else {
            warning("Invalid day.");
            return Ok(());
        };

        let Some(table) = self.latest_report_table()? else {
            return Ok(());
        };
        let filtered = table.filter_weekday(day);
        let name = weekday_name(day);

        if filtered.is_empty() {
            println!("No data on {}s.", name);
            return Ok(());
        }

        println!("{} records on {}s", filtered.len(), name);
        println!("Total hours: {:.1}", filtered.total_hours());
        if confirm("Show visualisation?", false)? {
            self.show_chart(ChartKind::EmployeeBar, &filtered, &format!(" - Only {}s", name))?;
        }
        Ok(())
    }
}

fn print_chart_menu() {
    for (i, kind) in ChartKind::ALL.iter().enumerate() {
        println!("{}. {}", i + 1, kind.menu_label());
    }
}

/// Prompt for a numbered selection; `None` when the operator's input selects nobody
fn select_employees(employees: &[String], prompt: &str) -> Result<Option<Vec<String>>> {
    println!("\nSelect employees (space-separated numbers):");
    print_numbered(employees);

    match parse_selection(&ask(prompt)?, employees.len()) {
        Ok(indices) => Ok(Some(
            indices.into_iter().map(|i| employees[i].clone()).collect(),
        )),
        Err(e) => {
            warning(&e.to_string());
            Ok(None)
        }
    }
}

fn join<'s>(items: impl IntoIterator<Item = &'s String>) -> String {
    items
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
