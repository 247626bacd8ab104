//! SVG drawing for each chart kind

use plotters::coord::Shift;
use plotters::coord::types::RangedCoordf64;
use plotters::element::Pie;
use plotters::prelude::*;
use plotters::style::Palette;
use std::error::Error;
use std::path::Path;

use super::ChartKind;
use super::data::{FiveNumber, cumulative, kernel_density, ranked, samples_by_study, scatter_points};
use crate::effort::{AggregatedTable, Pivot};

type DrawResult = Result<(), Box<dyn Error>>;

const SIZE: (u32, u32) = (1200, 700);
const FONT: &str = "sans-serif";

/// Draw `kind` for `table` into an SVG file at `path`
pub fn draw(kind: ChartKind, table: &AggregatedTable, title: &str, path: &Path) -> DrawResult {
    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    match kind {
        ChartKind::StudyBar => {
            vertical_bars(&root, title, &ranked(table.hours_by_study(), true), "Hours")?
        }
        ChartKind::EmployeeBar => {
            vertical_bars(&root, title, &ranked(table.hours_by_employee(), true), "Hours")?
        }
        ChartKind::HorizontalBar => {
            horizontal_bars(&root, title, &ranked(table.hours_by_study(), false))?
        }
        ChartKind::Pie => pie(&root, title, &table.hours_by_study().into_iter().collect::<Vec<_>>())?,
        ChartKind::StackedBar => stacked_bars(&root, title, &Pivot::employee_by_study(table))?,
        ChartKind::Line => line(&root, title, &table.hours_by_sheet().into_iter().collect::<Vec<_>>())?,
        ChartKind::Heatmap => heatmap(&root, title, &Pivot::employee_by_study(table))?,
        ChartKind::Boxplot => boxplot(&root, title, &samples_by_study(table))?,
        ChartKind::Violin => violin(&root, title, &samples_by_study(table))?,
        ChartKind::Scatter => scatter(&root, title, table)?,
        ChartKind::Area => area(&root, title, &Pivot::sheet_by_study(table), false)?,
        ChartKind::StackedArea => area(&root, title, &Pivot::sheet_by_study(table), true)?,
    }

    root.present()?;
    Ok(())
}

fn series_color(idx: usize) -> RGBColor {
    let (r, g, b) = Palette99::COLORS[idx % Palette99::COLORS.len()];
    RGBColor(r, g, b)
}

fn upper_bound(max: f64) -> f64 {
    if max.is_finite() && max > 0.0 { max * 1.1 } else { 1.0 }
}

/// Label for an integer position on a category axis, blank between positions
fn category_label(labels: &[String], x: f64) -> String {
    let idx = x.round();
    if (x - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

fn category_range(count: usize) -> std::ops::Range<f64> {
    -0.5..(count.max(1) as f64 - 0.5)
}

fn vertical_bars(
    root: &DrawingArea<SVGBackend, Shift>,
    title: &str,
    bars: &[(String, f64)],
    y_desc: &str,
) -> DrawResult {
    let labels: Vec<String> = bars.iter().map(|(l, _)| l.clone()).collect();
    let max = bars.iter().map(|(_, v)| *v).fold(0.0, f64::max);

    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT, 28))
        .margin(20)
        .x_label_area_size(80)
        .y_label_area_size(60)
        .build_cartesian_2d(category_range(bars.len()), 0f64..upper_bound(max))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(bars.len().max(1))
        .x_label_formatter(&|x| category_label(&labels, *x))
        .y_desc(y_desc)
        .draw()?;

    chart.draw_series(bars.iter().enumerate().map(|(i, (_, v))| {
        let x = i as f64;
        Rectangle::new([(x - 0.4, 0.0), (x + 0.4, *v)], series_color(0).filled())
    }))?;

    Ok(())
}

fn horizontal_bars(
    root: &DrawingArea<SVGBackend, Shift>,
    title: &str,
    bars: &[(String, f64)],
) -> DrawResult {
    let labels: Vec<String> = bars.iter().map(|(l, _)| l.clone()).collect();
    let max = bars.iter().map(|(_, v)| *v).fold(0.0, f64::max);

    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT, 28))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(120)
        .build_cartesian_2d(0f64..upper_bound(max), category_range(bars.len()))?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(bars.len().max(1))
        .y_label_formatter(&|y| category_label(&labels, *y))
        .x_desc("Hours")
        .draw()?;

    chart.draw_series(bars.iter().enumerate().map(|(i, (_, v))| {
        let y = i as f64;
        Rectangle::new([(0.0, y - 0.4), (*v, y + 0.4)], series_color(0).filled())
    }))?;

    Ok(())
}

fn pie(root: &DrawingArea<SVGBackend, Shift>, title: &str, slices: &[(String, f64)]) -> DrawResult {
    let slices: Vec<&(String, f64)> = slices.iter().filter(|(_, v)| *v > 0.0).collect();
    if slices.is_empty() {
        return Err("all studies have zero hours".into());
    }

    let root = root.titled(title, (FONT, 28))?;
    let (w, h) = root.dim_in_pixel();
    let center = (w as i32 / 2, h as i32 / 2);
    let radius = f64::from(w.min(h)) * 0.35;

    let sizes: Vec<f64> = slices.iter().map(|(_, v)| *v).collect();
    let colors: Vec<RGBColor> = (0..slices.len()).map(series_color).collect();
    let labels: Vec<String> = slices.iter().map(|(l, _)| l.clone()).collect();

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(90.0);
    pie.label_style((FONT, 16).into_font().color(&BLACK));
    pie.percentages((FONT, 14).into_font().color(&BLACK));
    root.draw(&pie)?;

    Ok(())
}

fn stacked_bars(root: &DrawingArea<SVGBackend, Shift>, title: &str, pivot: &Pivot) -> DrawResult {
    let stacks = cumulative(&pivot.values);
    let max = pivot.row_totals().into_iter().fold(0.0, f64::max);

    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT, 28))
        .margin(20)
        .x_label_area_size(80)
        .y_label_area_size(60)
        .build_cartesian_2d(category_range(pivot.rows.len()), 0f64..upper_bound(max))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(pivot.rows.len().max(1))
        .x_label_formatter(&|x| category_label(&pivot.rows, *x))
        .y_desc("Hours")
        .draw()?;

    for (s, study) in pivot.columns.iter().enumerate() {
        let color = series_color(s);
        chart
            .draw_series(stacks.iter().enumerate().map(|(e, stack)| {
                let x = e as f64;
                let bottom = if s == 0 { 0.0 } else { stack[s - 1] };
                Rectangle::new([(x - 0.4, bottom), (x + 0.4, stack[s])], color.filled())
            }))?
            .label(study.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    Ok(())
}

fn line(root: &DrawingArea<SVGBackend, Shift>, title: &str, points: &[(String, f64)]) -> DrawResult {
    let labels: Vec<String> = points.iter().map(|(l, _)| l.clone()).collect();
    let max = points.iter().map(|(_, v)| *v).fold(0.0, f64::max);

    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT, 28))
        .margin(20)
        .x_label_area_size(80)
        .y_label_area_size(60)
        .build_cartesian_2d(category_range(points.len()), 0f64..upper_bound(max))?;

    chart
        .configure_mesh()
        .x_labels(points.len().max(1))
        .x_label_formatter(&|x| category_label(&labels, *x))
        .y_desc("Hours")
        .draw()?;

    let color = series_color(0);
    let series: Vec<(f64, f64)> = points.iter().enumerate().map(|(i, (_, v))| (i as f64, *v)).collect();
    chart.draw_series(LineSeries::new(series.iter().copied(), color.stroke_width(2)))?;
    chart.draw_series(series.iter().map(|&(x, y)| Circle::new((x, y), 5, color.filled())))?;

    Ok(())
}

/// White to yellow to red, like a YlOrRd colormap
fn heat_color(value: f64, max: f64) -> RGBColor {
    let t = if max > 0.0 { (value / max).clamp(0.0, 1.0) } else { 0.0 };
    let stops = [(255.0, 255.0, 204.0), (253.0, 141.0, 60.0), (189.0, 0.0, 38.0)];
    let (a, b, local) = if t < 0.5 {
        (stops[0], stops[1], t * 2.0)
    } else {
        (stops[1], stops[2], (t - 0.5) * 2.0)
    };
    let lerp = |x: f64, y: f64| (x + (y - x) * local).round() as u8;
    RGBColor(lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
}

fn heatmap(root: &DrawingArea<SVGBackend, Shift>, title: &str, pivot: &Pivot) -> DrawResult {
    if pivot.is_empty() {
        return Err("nothing to pivot".into());
    }
    let max = pivot.max_value();

    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT, 28))
        .margin(20)
        .x_label_area_size(80)
        .y_label_area_size(120)
        .build_cartesian_2d(
            category_range(pivot.columns.len()),
            category_range(pivot.rows.len()),
        )?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(pivot.columns.len())
        .y_labels(pivot.rows.len())
        .x_label_formatter(&|x| category_label(&pivot.columns, *x))
        .y_label_formatter(&|y| category_label(&pivot.rows, *y))
        .draw()?;

    let cells: Vec<(f64, f64, f64)> = pivot
        .values
        .iter()
        .enumerate()
        .flat_map(|(r, row)| row.iter().enumerate().map(move |(c, v)| (c as f64, r as f64, *v)))
        .collect();

    chart.draw_series(cells.iter().map(|&(x, y, v)| {
        Rectangle::new([(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)], heat_color(v, max).filled())
    }))?;
    chart.draw_series(cells.iter().map(|&(x, y, v)| {
        Text::new(format!("{:.1}", v), (x - 0.1, y + 0.1), (FONT, 14).into_font())
    }))?;

    Ok(())
}

type HoursChart<'a, 'b> = ChartContext<'a, SVGBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Axes shared by the boxplot and violin charts: one category per study
fn distribution_chart<'a, 'b>(
    root: &'a DrawingArea<SVGBackend<'b>, Shift>,
    title: &str,
    groups: &[(String, Vec<f64>)],
    labels: &[String],
) -> Result<HoursChart<'a, 'b>, Box<dyn Error>> {
    let max = groups
        .iter()
        .flat_map(|(_, v)| v.iter().copied())
        .fold(0.0, f64::max);

    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT, 28))
        .margin(20)
        .x_label_area_size(80)
        .y_label_area_size(60)
        .build_cartesian_2d(category_range(groups.len()), -0.05 * upper_bound(max)..upper_bound(max))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(groups.len().max(1))
        .x_label_formatter(&|x| category_label(labels, *x))
        .y_desc("Hours")
        .draw()?;

    Ok(chart)
}

fn boxplot(
    root: &DrawingArea<SVGBackend, Shift>,
    title: &str,
    groups: &[(String, Vec<f64>)],
) -> DrawResult {
    let labels: Vec<String> = groups.iter().map(|(l, _)| l.clone()).collect();
    let mut chart = distribution_chart(root, title, groups, &labels)?;

    for (i, (_, samples)) in groups.iter().enumerate() {
        let Some(s) = FiveNumber::from_samples(samples) else {
            continue;
        };
        let x = i as f64;
        let color = series_color(i);

        chart.draw_series(std::iter::once(Rectangle::new(
            [(x - 0.3, s.q1), (x + 0.3, s.q3)],
            color.mix(0.6).filled(),
        )))?;
        chart.draw_series(std::iter::once(Rectangle::new(
            [(x - 0.3, s.q1), (x + 0.3, s.q3)],
            BLACK.stroke_width(1),
        )))?;
        chart.draw_series(
            [
                vec![(x - 0.3, s.median), (x + 0.3, s.median)],
                vec![(x, s.min), (x, s.q1)],
                vec![(x, s.q3), (x, s.max)],
                vec![(x - 0.15, s.min), (x + 0.15, s.min)],
                vec![(x - 0.15, s.max), (x + 0.15, s.max)],
            ]
            .into_iter()
            .map(|pts| PathElement::new(pts, BLACK.stroke_width(2))),
        )?;
    }

    Ok(())
}

fn violin(
    root: &DrawingArea<SVGBackend, Shift>,
    title: &str,
    groups: &[(String, Vec<f64>)],
) -> DrawResult {
    let labels: Vec<String> = groups.iter().map(|(l, _)| l.clone()).collect();
    let mut chart = distribution_chart(root, title, groups, &labels)?;

    for (i, (_, samples)) in groups.iter().enumerate() {
        let density = kernel_density(samples, 64);
        let peak = density.iter().map(|(_, d)| *d).fold(0.0, f64::max);
        if peak <= 0.0 {
            continue;
        }
        let x = i as f64;
        let width = |d: f64| d / peak * 0.4;

        let mut outline: Vec<(f64, f64)> = density.iter().map(|&(y, d)| (x - width(d), y)).collect();
        outline.extend(density.iter().rev().map(|&(y, d)| (x + width(d), y)));

        let color = series_color(i);
        chart.draw_series(std::iter::once(Polygon::new(outline.clone(), color.mix(0.6).filled())))?;
        chart.draw_series(std::iter::once(PathElement::new(outline, color.stroke_width(1))))?;

        if let Some(s) = FiveNumber::from_samples(samples) {
            chart.draw_series(std::iter::once(PathElement::new(
                vec![(x, s.q1), (x, s.q3)],
                BLACK.stroke_width(4),
            )))?;
            chart.draw_series(std::iter::once(Circle::new((x, s.median), 4, WHITE.filled())))?;
        }
    }

    Ok(())
}

fn scatter(root: &DrawingArea<SVGBackend, Shift>, title: &str, table: &AggregatedTable) -> DrawResult {
    let (sheets, points) = scatter_points(table);
    let studies: Vec<String> = table.hours_by_study().into_keys().collect();
    let max = points.iter().map(|p| p.hours).fold(0.0, f64::max);

    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT, 28))
        .margin(20)
        .x_label_area_size(80)
        .y_label_area_size(60)
        .build_cartesian_2d(category_range(sheets.len()), 0f64..upper_bound(max))?;

    chart
        .configure_mesh()
        .x_labels(sheets.len().max(1))
        .x_label_formatter(&|x| category_label(&sheets, *x))
        .y_desc("Hours")
        .draw()?;

    for (s, study) in studies.iter().enumerate() {
        let color = series_color(s);
        chart
            .draw_series(
                points
                    .iter()
                    .filter(|p| &p.study_id == study)
                    .map(|p| Circle::new((p.sheet_index as f64, p.hours), 6, color.filled())),
            )?
            .label(study.as_str())
            .legend(move |(x, y)| Circle::new((x + 5, y), 5, color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    Ok(())
}

fn area(
    root: &DrawingArea<SVGBackend, Shift>,
    title: &str,
    pivot: &Pivot,
    stacked: bool,
) -> DrawResult {
    if pivot.is_empty() {
        return Err("nothing to pivot".into());
    }

    let layers = if stacked { cumulative(&pivot.values) } else { pivot.values.clone() };
    let max = layers.iter().flatten().copied().fold(0.0, f64::max);

    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT, 28))
        .margin(20)
        .x_label_area_size(80)
        .y_label_area_size(60)
        .build_cartesian_2d(category_range(pivot.rows.len()), 0f64..upper_bound(max))?;

    chart
        .configure_mesh()
        .x_labels(pivot.rows.len())
        .x_label_formatter(&|x| category_label(&pivot.rows, *x))
        .y_desc("Hours")
        .draw()?;

    for (s, study) in pivot.columns.iter().enumerate() {
        let color = series_color(s);
        let top: Vec<(f64, f64)> = layers.iter().enumerate().map(|(i, row)| (i as f64, row[s])).collect();
        let bottom: Vec<(f64, f64)> = if stacked && s > 0 {
            layers.iter().enumerate().map(|(i, row)| (i as f64, row[s - 1])).collect()
        } else {
            layers.iter().enumerate().map(|(i, _)| (i as f64, 0.0)).collect()
        };

        let mut outline = top.clone();
        outline.extend(bottom.into_iter().rev());

        let fill = if stacked { color.mix(0.8) } else { color.mix(0.35) };
        chart
            .draw_series(std::iter::once(Polygon::new(outline, fill.filled())))?
            .label(study.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
        chart.draw_series(std::iter::once(PathElement::new(top, color.stroke_width(2))))?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_label() {
        let labels = vec!["STUDY1".to_string(), "STUDY2".to_string()];
        assert_eq!(category_label(&labels, 0.0), "STUDY1");
        assert_eq!(category_label(&labels, 1.0000000001), "STUDY2");
        assert_eq!(category_label(&labels, 0.5), "");
        assert_eq!(category_label(&labels, -1.0), "");
        assert_eq!(category_label(&labels, 5.0), "");
    }

    #[test]
    fn test_heat_color_endpoints() {
        assert_eq!(heat_color(0.0, 10.0), RGBColor(255, 255, 204));
        assert_eq!(heat_color(10.0, 10.0), RGBColor(189, 0, 38));
        assert_eq!(heat_color(5.0, 0.0), RGBColor(255, 255, 204));
    }

    #[test]
    fn test_upper_bound() {
        assert_eq!(upper_bound(0.0), 1.0);
        assert_eq!(upper_bound(f64::NAN), 1.0);
        assert!((upper_bound(10.0) - 11.0).abs() < 1e-9);
    }
}
