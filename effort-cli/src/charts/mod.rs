//! Chart rendering over an aggregated table
//!
//! Every chart is written as an SVG into the configured chart directory.

pub mod data;
pub mod render;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::Config;
use crate::effort::AggregatedTable;

/// Why a chart was not drawn
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum NoDataError {
    #[error("No data to plot")]
    EmptyTable,

    #[error("No sheet information available for this chart")]
    MissingSheetLabels,
}

#[derive(Debug, Error)]
pub enum ChartError {
    #[error(transparent)]
    NoData(#[from] NoDataError),

    #[error("Failed to render chart: {0}")]
    Render(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    StudyBar,
    Pie,
    EmployeeBar,
    HorizontalBar,
    StackedBar,
    Line,
    Heatmap,
    Boxplot,
    Violin,
    Scatter,
    Area,
    StackedArea,
}

impl ChartKind {
    /// Menu order
    pub const ALL: [ChartKind; 12] = [
        ChartKind::StudyBar,
        ChartKind::Pie,
        ChartKind::EmployeeBar,
        ChartKind::HorizontalBar,
        ChartKind::StackedBar,
        ChartKind::Line,
        ChartKind::Heatmap,
        ChartKind::Boxplot,
        ChartKind::Violin,
        ChartKind::Scatter,
        ChartKind::Area,
        ChartKind::StackedArea,
    ];

    pub fn menu_label(self) -> &'static str {
        match self {
            ChartKind::StudyBar => "Bar chart: total hours by study",
            ChartKind::Pie => "Pie chart: share of hours by study",
            ChartKind::EmployeeBar => "Bar chart: total hours by employee",
            ChartKind::HorizontalBar => "Horizontal bar chart: hours by study",
            ChartKind::StackedBar => "Stacked bar chart: employees by study",
            ChartKind::Line => "Line chart: hours over sheets",
            ChartKind::Heatmap => "Heatmap: employees vs studies",
            ChartKind::Boxplot => "Boxplot: hours per study",
            ChartKind::Violin => "Violin plot: hours per study",
            ChartKind::Scatter => "Scatter plot: hours per sheet",
            ChartKind::Area => "Area chart: studies over sheets",
            ChartKind::StackedArea => "Stacked area chart: studies over sheets",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::StudyBar => "Total Hours by Study",
            ChartKind::Pie => "Share of Hours by Study",
            ChartKind::EmployeeBar => "Total Hours by Employee",
            ChartKind::HorizontalBar => "Hours by Study",
            ChartKind::StackedBar => "Hours by Employee and Study",
            ChartKind::Line => "Hours over Sheets",
            ChartKind::Heatmap => "Hours Heatmap: Employee vs Study",
            ChartKind::Boxplot => "Distribution of Hours per Study",
            ChartKind::Violin => "Density of Hours per Study",
            ChartKind::Scatter => "Hours per Sheet by Study",
            ChartKind::Area => "Study Hours over Sheets",
            ChartKind::StackedArea => "Cumulative Study Hours over Sheets",
        }
    }

    /// File stem of the rendered SVG
    pub fn slug(self) -> &'static str {
        match self {
            ChartKind::StudyBar => "study-bar",
            ChartKind::Pie => "study-pie",
            ChartKind::EmployeeBar => "employee-bar",
            ChartKind::HorizontalBar => "study-horizontal-bar",
            ChartKind::StackedBar => "stacked-bar",
            ChartKind::Line => "sheet-line",
            ChartKind::Heatmap => "heatmap",
            ChartKind::Boxplot => "boxplot",
            ChartKind::Violin => "violin",
            ChartKind::Scatter => "scatter",
            ChartKind::Area => "area",
            ChartKind::StackedArea => "stacked-area",
        }
    }

    /// Kinds plotted against sheet labels
    pub fn requires_sheet(self) -> bool {
        matches!(
            self,
            ChartKind::Line | ChartKind::Scatter | ChartKind::Area | ChartKind::StackedArea
        )
    }

    /// 1-based menu number
    pub fn from_menu_choice(choice: usize) -> Option<Self> {
        Self::ALL.get(choice.checked_sub(1)?).copied()
    }
}

/// A chart written to disk
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub kind: ChartKind,
    pub title: String,
    pub path: PathBuf,
}

pub fn check_data(table: &AggregatedTable, requires_sheet: bool) -> Result<(), NoDataError> {
    if table.is_empty() {
        return Err(NoDataError::EmptyTable);
    }
    if requires_sheet && !table.has_sheet_labels() {
        return Err(NoDataError::MissingSheetLabels);
    }
    Ok(())
}

/// Wrap a renderer so it only runs on tables it can plot
pub fn with_data_guard<F>(
    requires_sheet: bool,
    render: F,
) -> impl Fn(&AggregatedTable, &str) -> Result<Figure, ChartError>
where
    F: Fn(&AggregatedTable, &str) -> Result<Figure, ChartError>,
{
    move |table, suffix| {
        check_data(table, requires_sheet)?;
        render(table, suffix)
    }
}

pub struct ChartRenderer {
    out_dir: PathBuf,
}

impl ChartRenderer {
    pub fn new(config: &Config) -> Self {
        Self {
            out_dir: config.chart_path(),
        }
    }

    /// Render one chart; `suffix` is appended to the title
    pub fn render(
        &self,
        kind: ChartKind,
        table: &AggregatedTable,
        suffix: &str,
    ) -> Result<Figure, ChartError> {
        let draw = with_data_guard(kind.requires_sheet(), |table, suffix| {
            self.draw(kind, table, suffix)
        });
        draw(table, suffix)
    }

    fn draw(&self, kind: ChartKind, table: &AggregatedTable, suffix: &str) -> Result<Figure, ChartError> {
        std::fs::create_dir_all(&self.out_dir).map_err(|e| {
            ChartError::Render(format!("{}: {}", self.out_dir.display(), e))
        })?;

        let title = format!("{}{}", kind.title(), suffix);
        let path = self.out_dir.join(format!("{}.svg", kind.slug()));

        render::draw(kind, table, &title, &path).map_err(|e| ChartError::Render(e.to_string()))?;
        log::info!("Chart exported to: {}", path.display());

        Ok(Figure { kind, title, path })
    }
}

/// Open a rendered chart with the platform viewer
pub fn open_in_viewer(path: &Path) -> Result<()> {
    use std::process::Command;

    let result = if cfg!(target_os = "windows") {
        Command::new("cmd")
            .args(["/c", "start", ""])
            .arg(path)
            .spawn()
    } else if cfg!(target_os = "macos") {
        Command::new("open").arg(path).spawn()
    } else {
        Command::new("xdg-open").arg(path).spawn()
    };

    result.with_context(|| format!("Could not open {}", path.display()))?;
    log::info!("Opened chart: {}", path.display());
    Ok(())
}
