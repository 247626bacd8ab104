//! Chart data preparation, kept free of any drawing

use std::collections::BTreeMap;

use crate::effort::AggregatedTable;

/// Sort `(label, value)` pairs by value, ties broken by label
pub fn ranked(totals: BTreeMap<String, f64>, descending: bool) -> Vec<(String, f64)> {
    let mut pairs: Vec<(String, f64)> = totals.into_iter().collect();
    pairs.sort_by(|a, b| {
        let ord = a.1.total_cmp(&b.1);
        let ord = if descending { ord.reverse() } else { ord };
        ord.then_with(|| a.0.cmp(&b.0))
    });
    pairs
}

/// Hours of every row grouped by study, studies ascending
pub fn samples_by_study(table: &AggregatedTable) -> Vec<(String, Vec<f64>)> {
    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for row in table.rows() {
        groups.entry(row.study_id.clone()).or_default().push(row.hours);
    }
    groups.into_iter().collect()
}

/// Minimum, quartiles and maximum of a sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiveNumber {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl FiveNumber {
    /// Quartiles by linear interpolation between order statistics
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = samples.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        Some(Self {
            min: sorted[0],
            q1: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q3: quantile(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
        })
    }
}

fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Gaussian kernel density estimate sampled at `points` evenly spaced values
///
/// Bandwidth follows Scott's rule; a constant sample gets a unit bandwidth.
/// The grid extends two bandwidths past the sample range.
pub fn kernel_density(samples: &[f64], points: usize) -> Vec<(f64, f64)> {
    let values: Vec<f64> = samples.iter().copied().filter(|v| v.is_finite()).collect();
    if values.is_empty() || points < 2 {
        return Vec::new();
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = if values.len() > 1 {
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)
    } else {
        0.0
    };
    let std_dev = variance.sqrt();
    let bandwidth = if std_dev > 0.0 {
        std_dev * n.powf(-0.2)
    } else {
        1.0
    };

    let lo = values.iter().copied().fold(f64::INFINITY, f64::min) - 2.0 * bandwidth;
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max) + 2.0 * bandwidth;
    let step = (hi - lo) / (points - 1) as f64;
    let norm = 1.0 / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt());

    (0..points)
        .map(|i| {
            let x = lo + step * i as f64;
            let density: f64 = values
                .iter()
                .map(|v| (-0.5 * ((x - v) / bandwidth).powi(2)).exp())
                .sum();
            (x, density * norm)
        })
        .collect()
}

/// Running totals across each row, used for stacked bars and areas
pub fn cumulative(values: &[Vec<f64>]) -> Vec<Vec<f64>> {
    values
        .iter()
        .map(|row| {
            row.iter()
                .scan(0.0, |acc, v| {
                    *acc += v;
                    Some(*acc)
                })
                .collect()
        })
        .collect()
}

/// One scatter point: sheet position, hours, study
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub sheet_index: usize,
    pub hours: f64,
    pub study_id: String,
}

/// Sheet labels ascending and one point per labelled row
pub fn scatter_points(table: &AggregatedTable) -> (Vec<String>, Vec<ScatterPoint>) {
    let sheets: Vec<String> = table.hours_by_sheet().into_keys().collect();
    let points = table
        .rows()
        .iter()
        .filter(|r| r.has_sheet())
        .filter_map(|r| {
            let sheet_index = sheets.binary_search(&r.sheet).ok()?;
            Some(ScatterPoint {
                sheet_index,
                hours: r.hours,
                study_id: r.study_id.clone(),
            })
        })
        .collect();
    (sheets, points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effort::fixtures::{row, two_employees};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ranked() {
        let table = two_employees();

        assert_eq!(
            ranked(table.hours_by_employee(), true),
            vec![("bob".to_string(), 25.0), ("alice".to_string(), 10.0)]
        );
        assert_eq!(
            ranked(table.hours_by_study(), false),
            vec![("STUDY2".to_string(), 5.0), ("STUDY1".to_string(), 30.0)]
        );
    }

    #[test]
    fn test_ranked_ties_by_label() {
        let totals: BTreeMap<String, f64> =
            [("b".to_string(), 1.0), ("a".to_string(), 1.0)].into_iter().collect();
        assert_eq!(
            ranked(totals, true),
            vec![("a".to_string(), 1.0), ("b".to_string(), 1.0)]
        );
    }

    #[test]
    fn test_samples_by_study() {
        assert_eq!(
            samples_by_study(&two_employees()),
            vec![
                ("STUDY1".to_string(), vec![6.0, 4.0, 20.0]),
                ("STUDY2".to_string(), vec![5.0]),
            ]
        );
    }

    #[test]
    fn test_five_number_summary() {
        let summary = FiveNumber::from_samples(&[4.0, 1.0, 3.0, 2.0, 5.0]).unwrap();
        assert_eq!(
            summary,
            FiveNumber {
                min: 1.0,
                q1: 2.0,
                median: 3.0,
                q3: 4.0,
                max: 5.0
            }
        );

        let even = FiveNumber::from_samples(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(even.q1, 1.75);
        assert_eq!(even.median, 2.5);
        assert_eq!(even.q3, 3.25);

        assert_eq!(FiveNumber::from_samples(&[]), None);
        assert_eq!(FiveNumber::from_samples(&[7.0]).unwrap().median, 7.0);
    }

    #[test]
    fn test_kernel_density() {
        let density = kernel_density(&[1.0, 2.0, 2.0, 3.0], 50);
        assert_eq!(density.len(), 50);

        let step = density[1].0 - density[0].0;
        let area: f64 = density.iter().map(|(_, d)| d * step).sum();
        assert!(area > 0.85 && area < 1.05, "area {}", area);

        let peak = density
            .iter()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap();
        assert!((peak.0 - 2.0).abs() < 0.3, "peak at {}", peak.0);

        assert!(kernel_density(&[], 50).is_empty());
        assert_eq!(kernel_density(&[5.0], 10).len(), 10);
    }

    #[test]
    fn test_cumulative() {
        assert_eq!(
            cumulative(&[vec![1.0, 2.0, 3.0], vec![0.0, 5.0, 0.0]]),
            vec![vec![1.0, 3.0, 6.0], vec![0.0, 5.0, 5.0]]
        );
    }

    #[test]
    fn test_scatter_points_skip_unlabelled_rows() {
        let mut table = two_employees();
        table.push(row("carol", "STUDY9", 1.0, ""));

        let (sheets, points) = scatter_points(&table);
        assert_eq!(sheets, vec!["Week 1", "Week 2"]);
        assert_eq!(points.len(), 4);
        assert_eq!(
            points[3],
            ScatterPoint {
                sheet_index: 1,
                hours: 5.0,
                study_id: "STUDY2".to_string()
            }
        );
    }
}
