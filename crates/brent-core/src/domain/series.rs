use serde::{Deserialize, Serialize};

use crate::{DateRange, Ticker, TradeDate, ValidationError};

/// One trading day; `price` is `None` when the provider had no value for that day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: TradeDate,
    pub price: Option<f64>,
}

impl PricePoint {
    pub fn new(date: TradeDate, price: Option<f64>) -> Result<Self, ValidationError> {
        if let Some(value) = price {
            validate_positive(date, value)?;
        }
        Ok(Self { date, price })
    }

    pub const fn gap(date: TradeDate) -> Self {
        Self { date, price: None }
    }

    pub const fn is_gap(&self) -> bool {
        self.price.is_none()
    }
}

/// Canonical daily price series: ascending, duplicate-free, timezone-naive.
///
/// Read-only once built; filtering produces a new series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    ticker: Ticker,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(ticker: Ticker, points: Vec<PricePoint>) -> Result<Self, ValidationError> {
        for window in points.windows(2) {
            if window[0].date >= window[1].date {
                return Err(ValidationError::UnorderedDates {
                    previous: window[0].date.format_iso(),
                    next: window[1].date.format_iso(),
                });
            }
        }
        for point in &points {
            if let Some(value) = point.price {
                validate_positive(point.date, value)?;
            }
        }

        Ok(Self { ticker, points })
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<TradeDate> {
        self.points.first().map(|point| point.date)
    }

    pub fn last_date(&self) -> Option<TradeDate> {
        self.points.last().map(|point| point.date)
    }

    pub fn gap_count(&self) -> usize {
        self.points.iter().filter(|point| point.is_gap()).count()
    }

    /// Observations with a price, skipping gaps.
    pub fn observed(&self) -> impl Iterator<Item = (TradeDate, f64)> + '_ {
        self.points
            .iter()
            .filter_map(|point| point.price.map(|price| (point.date, price)))
    }

    /// New series holding only the points inside `range`.
    pub fn within(&self, range: &DateRange) -> Self {
        Self {
            ticker: self.ticker.clone(),
            points: self
                .points
                .iter()
                .filter(|point| range.contains(point.date))
                .copied()
                .collect(),
        }
    }

    /// First observation with a price dated on or after `date`.
    pub fn observed_on_or_after(&self, date: TradeDate) -> Option<(TradeDate, f64)> {
        let index = self.points.partition_point(|point| point.date < date);
        self.points[index..]
            .iter()
            .find_map(|point| point.price.map(|price| (point.date, price)))
    }
}

fn validate_positive(date: TradeDate, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::NonPositivePrice {
            date: date.format_iso(),
            value,
        });
    }
    Ok(())
}
