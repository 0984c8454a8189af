use thiserror::Error;

use crate::provider::ProviderError;

/// Validation and contract errors exposed by `brent-core`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("ticker cannot be empty")]
    EmptyTicker,
    #[error("ticker length {len} exceeds max {max}")]
    TickerTooLong { len: usize, max: usize },
    #[error("ticker must start with an ASCII letter or '^': '{ch}'")]
    TickerInvalidStart { ch: char },
    #[error("ticker contains invalid character '{ch}' at index {index}")]
    TickerInvalidChar { ch: char, index: usize },

    #[error("date must be formatted as YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },

    #[error("start date {start} is after end date {end}")]
    InvertedRange { start: String, end: String },

    #[error("dates must be strictly increasing: {previous} is followed by {next}")]
    UnorderedDates { previous: String, next: String },
    #[error("price on {date} must be finite and positive, got {value}")]
    NonPositivePrice { date: String, value: f64 },

    #[error("column '{column}' has {len} values but the index has {expected}")]
    ColumnLengthMismatch {
        column: String,
        len: usize,
        expected: usize,
    },
    #[error("price field priority must name at least one field")]
    EmptyFieldPriority,
}

/// Errors surfaced by [`PriceSeriesLoader::load`](crate::PriceSeriesLoader::load).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LoadError {
    #[error("invalid ticker: {0}")]
    InvalidTicker(ValidationError),

    #[error("invalid date range: start {start} is after end {end}")]
    InvalidRange { start: String, end: String },

    #[error("no price field found for {ticker}; tried {tried:?}, provider returned {available:?}")]
    MissingPriceField {
        ticker: String,
        tried: Vec<String>,
        available: Vec<String>,
    },

    #[error("provider returned no observations for {ticker} in {range}")]
    EmptyResult { ticker: String, range: String },

    #[error("invalid price from provider: {0}")]
    InvalidPrice(ValidationError),

    #[error("fetch failed: {0}")]
    Network(#[from] ProviderError),
}

impl LoadError {
    /// Stable machine-readable code for this error.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidTicker(_) => "load.invalid_ticker",
            Self::InvalidRange { .. } => "load.invalid_range",
            Self::MissingPriceField { .. } => "load.missing_price_field",
            Self::EmptyResult { .. } => "load.empty_result",
            Self::InvalidPrice(_) => "load.invalid_price",
            Self::Network(_) => "load.network",
        }
    }

    /// True when the failure came from the caller's arguments rather than upstream.
    pub const fn is_caller_error(&self) -> bool {
        matches!(self, Self::InvalidTicker(_) | Self::InvalidRange { .. })
    }
}
