//! Oil market crises annotated on the historical chart.

use brent_core::{PriceSeries, TradeDate};
use serde::Serialize;
use time::macros::date;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrisisMarker {
    pub label: &'static str,
    pub date: TradeDate,
}

pub const CRISES: [CrisisMarker; 3] = [
    CrisisMarker {
        label: "2008 financial crisis",
        date: TradeDate::new(date!(2008-07-01)),
    },
    CrisisMarker {
        label: "2014 oil price drop",
        date: TradeDate::new(date!(2014-06-01)),
    },
    CrisisMarker {
        label: "COVID-19 pandemic",
        date: TradeDate::new(date!(2020-03-01)),
    },
];

/// A marker paired with the first observed price on or after its date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrisisReading {
    pub label: &'static str,
    pub marker_date: TradeDate,
    pub observed_date: Option<TradeDate>,
    pub price: Option<f64>,
}

pub fn annotate(series: &PriceSeries) -> Vec<CrisisReading> {
    CRISES
        .iter()
        .map(|marker| {
            let observed = series.observed_on_or_after(marker.date);
            CrisisReading {
                label: marker.label,
                marker_date: marker.date,
                observed_date: observed.map(|(date, _)| date),
                price: observed.map(|(_, price)| price),
            }
        })
        .collect()
}
