use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{TradeDate, ValidationError};

/// Inclusive calendar window; an open bound means earliest or latest available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: Option<TradeDate>,
    end: Option<TradeDate>,
}

impl DateRange {
    pub fn new(start: Option<TradeDate>, end: Option<TradeDate>) -> Result<Self, ValidationError> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(ValidationError::InvertedRange {
                    start: start.format_iso(),
                    end: end.format_iso(),
                });
            }
        }
        Ok(Self { start, end })
    }

    /// Everything the provider has.
    pub const fn full() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    pub const fn start(&self) -> Option<TradeDate> {
        self.start
    }

    pub const fn end(&self) -> Option<TradeDate> {
        self.end
    }

    pub fn contains(&self, date: TradeDate) -> bool {
        self.start.map_or(true, |start| date >= start) && self.end.map_or(true, |end| date <= end)
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let start = self
            .start
            .map_or_else(|| String::from("earliest"), TradeDate::format_iso);
        let end = self
            .end
            .map_or_else(|| String::from("latest"), TradeDate::format_iso);
        write!(f, "[{start}, {end}]")
    }
}
