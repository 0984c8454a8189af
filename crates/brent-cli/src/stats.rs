//! Yearly aggregation of a price series.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use brent_core::PriceSeries;
use clap::ValueEnum;
use serde::Serialize;

/// Yearly statistic selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Max,
    Min,
    Mean,
}

impl Metric {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Max => "max",
            Self::Min => "min",
            Self::Mean => "mean",
        }
    }
}

impl Display for Metric {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearlyStats {
    pub year: i32,
    pub max: f64,
    pub min: f64,
    pub mean: f64,
    pub observations: usize,
}

impl YearlyStats {
    pub const fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Max => self.max,
            Metric::Min => self.min,
            Metric::Mean => self.mean,
        }
    }
}

/// Per-year max/min/mean of the observed prices. Gaps are ignored; a year with
/// nothing but gaps is left out.
pub fn yearly_stats(series: &PriceSeries) -> Vec<YearlyStats> {
    let mut years: BTreeMap<i32, (f64, f64, f64, usize)> = BTreeMap::new();
    for (date, price) in series.observed() {
        let entry = years
            .entry(date.year())
            .or_insert((f64::NEG_INFINITY, f64::INFINITY, 0.0, 0));
        entry.0 = entry.0.max(price);
        entry.1 = entry.1.min(price);
        entry.2 += price;
        entry.3 += 1;
    }

    years
        .into_iter()
        .map(|(year, (max, min, sum, observations))| YearlyStats {
            year,
            max,
            min,
            mean: sum / observations as f64,
            observations,
        })
        .collect()
}
