//! Funnel chart series — the three bottom-of-funnel stages in display order.

use std::str::FromStr;

use roas_core::types::OutcomeMetrics;
use roas_core::ProjectorError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    #[default]
    Bar,
    Doughnut,
    Line,
}

impl FromStr for ChartKind {
    type Err = ProjectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bar" => Ok(Self::Bar),
            "doughnut" | "pie" => Ok(Self::Doughnut),
            "line" => Ok(Self::Line),
            other => Err(ProjectorError::Validation(format!(
                "unknown chart kind '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelStagePoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelSeries {
    pub title: String,
    pub kind: ChartKind,
    pub points: Vec<FunnelStagePoint>,
}

impl FunnelSeries {
    /// Nothing to draw until the campaign produces at least one visit.
    pub fn is_empty(&self) -> bool {
        self.points.iter().all(|p| p.value == 0.0)
    }

    /// Share of the first stage that survives to each stage, in percent.
    pub fn retention_pct(&self) -> Vec<f64> {
        let top = self.points.first().map_or(0.0, |p| p.value);
        self.points
            .iter()
            .map(|p| if top > 0.0 { p.value / top * 100.0 } else { 0.0 })
            .collect()
    }
}

/// Visits, checkouts and sales as three ordered categories.
pub fn funnel_series(metrics: &OutcomeMetrics, kind: ChartKind) -> FunnelSeries {
    let stages = [
        ("Landing page visits", metrics.visits),
        ("Checkouts", metrics.checkouts),
        ("Sales", metrics.sales),
    ];

    FunnelSeries {
        title: "Sales funnel".to_string(),
        kind,
        points: stages
            .iter()
            .map(|(label, value)| FunnelStagePoint {
                label: label.to_string(),
                value: *value,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> OutcomeMetrics {
        OutcomeMetrics {
            visits: 1700.0,
            checkouts: 85.0,
            sales: 72.25,
            ..Default::default()
        }
    }

    #[test]
    fn test_series_order() {
        let series = funnel_series(&metrics(), ChartKind::Bar);
        let labels: Vec<&str> = series.points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["Landing page visits", "Checkouts", "Sales"]);
        assert_eq!(series.points[2].value, 72.25);
        assert!(!series.is_empty());
    }

    #[test]
    fn test_empty_series() {
        let series = funnel_series(&OutcomeMetrics::default(), ChartKind::Line);
        assert!(series.is_empty());
        assert_eq!(series.retention_pct(), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_retention() {
        let retention = funnel_series(&metrics(), ChartKind::Bar).retention_pct();
        assert!((retention[0] - 100.0).abs() < f64::EPSILON);
        assert!((retention[1] - 5.0).abs() < 1e-9);
        assert!((retention[2] - 4.25).abs() < 1e-9);
    }

    #[test]
    fn test_chart_kind_parsing() {
        assert_eq!("Pie".parse::<ChartKind>().unwrap(), ChartKind::Doughnut);
        assert_eq!("line".parse::<ChartKind>().unwrap(), ChartKind::Line);
        assert!("radar".parse::<ChartKind>().is_err());
        assert_eq!(ChartKind::default(), ChartKind::Bar);
    }
}
