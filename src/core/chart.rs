use serde::Serialize;

use super::format::{format_axis_label, format_tooltip};
use super::types::{ChartSeriesKind, YearlySnapshot};

pub const DEFAULT_TICK_COUNT: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisTick {
    pub value: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub label: &'static str,
    pub values: Vec<f64>,
    pub tooltips: Vec<String>,
}

impl ChartSeries {
    fn new(label: &'static str, values: Vec<f64>) -> Self {
        let tooltips = values.iter().map(|v| format_tooltip(*v)).collect();
        Self {
            label,
            values,
            tooltips,
        }
    }
}

/// Parallel series extracted from one projection, ready for a bar renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub series_kind: ChartSeriesKind,
    pub stacked: bool,
    pub labels: Vec<i32>,
    pub base: ChartSeries,
    pub interest: ChartSeries,
    pub y_ticks: Vec<AxisTick>,
}

impl ChartData {
    pub fn from_snapshots(snapshots: &[YearlySnapshot], kind: ChartSeriesKind) -> Self {
        let labels = snapshots.iter().map(|s| s.year).collect();
        let (base_label, base_values): (&'static str, Vec<f64>) = match kind {
            ChartSeriesKind::ContributedPrincipal => (
                "Principal",
                snapshots.iter().map(|s| s.principal_contributed).collect(),
            ),
            ChartSeriesKind::TotalValue => (
                "Total Value",
                snapshots.iter().map(|s| s.total_value).collect(),
            ),
        };
        let interest_values: Vec<f64> = snapshots.iter().map(|s| s.earned_interest).collect();
        let stacked = kind == ChartSeriesKind::ContributedPrincipal;

        let axis_max = base_values
            .iter()
            .zip(&interest_values)
            .map(|(base, interest)| {
                if stacked {
                    base + interest.max(0.0)
                } else {
                    base.max(*interest)
                }
            })
            .fold(0.0_f64, f64::max);

        Self {
            series_kind: kind,
            stacked,
            labels,
            base: ChartSeries::new(base_label, base_values),
            interest: ChartSeries::new("Earned Interest", interest_values),
            y_ticks: tick_values(axis_max, DEFAULT_TICK_COUNT),
        }
    }
}

/// Evenly spaced ticks from zero to `max` inclusive, each with its axis label.
///
/// The axis always begins at zero; a non-positive or non-finite `max` yields
/// a single zero tick.
pub fn tick_values(max: f64, count: usize) -> Vec<AxisTick> {
    if !max.is_finite() || max <= 0.0 || count < 2 {
        return vec![AxisTick {
            value: 0.0,
            label: format_axis_label(0.0),
        }];
    }

    let step = max / (count - 1) as f64;
    (0..count)
        .map(|i| {
            let value = if i == count - 1 { max } else { step * i as f64 };
            AxisTick {
                value,
                label: format_axis_label(value),
            }
        })
        .collect()
}
