//! Fetch, validate and reshape daily price history into a [`PriceSeries`].
//!
//! # Pipeline
//!
//! 1. Reject bad arguments (`start > end`, malformed ticker) before any fetch.
//! 2. Serve from the memo cache when one is attached and the mode allows it.
//! 3. Fetch the provider table.
//! 4. Pick the first column named in [`PriceFieldPriority`].
//! 5. Reduce every timestamp to its local calendar date and drop the offset.
//! 6. Sort ascending, keep one observation per date, clip to the range.
//! 7. Validate prices and build the series.

use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, info};

use crate::cache::{CacheMode, LoadKey, SeriesCache};
use crate::provider::{columns, HistoryRequest, PriceProvider, RawPriceTable};
use crate::{DateRange, LoadError, PricePoint, PriceSeries, Ticker, TradeDate, ValidationError};

/// Ordered list of acceptable price columns; the first one present wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceFieldPriority(Vec<String>);

impl Default for PriceFieldPriority {
    fn default() -> Self {
        Self(vec![
            String::from(columns::ADJ_CLOSE),
            String::from(columns::CLOSE),
        ])
    }
}

impl PriceFieldPriority {
    pub fn new<I, S>(fields: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields = fields.into_iter().map(Into::into).collect::<Vec<_>>();
        if fields.is_empty() {
            return Err(ValidationError::EmptyFieldPriority);
        }
        Ok(Self(fields))
    }

    pub fn fields(&self) -> &[String] {
        &self.0
    }

    /// First listed column the table actually has.
    pub fn select<'t>(&self, table: &'t RawPriceTable) -> Option<(&str, &'t [Option<f64>])> {
        self.0
            .iter()
            .find_map(|field| table.column(field).map(|values| (field.as_str(), values)))
    }
}

/// Produces canonical price series for a ticker and date range.
#[derive(Clone)]
pub struct PriceSeriesLoader {
    provider: Arc<dyn PriceProvider>,
    fields: PriceFieldPriority,
    cache: Option<SeriesCache>,
    cache_mode: CacheMode,
}

impl PriceSeriesLoader {
    /// Loader without memoization: every call reaches the provider.
    pub fn new(provider: Arc<dyn PriceProvider>) -> Self {
        Self {
            provider,
            fields: PriceFieldPriority::default(),
            cache: None,
            cache_mode: CacheMode::Use,
        }
    }

    pub fn with_cache(mut self, cache: SeriesCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_cache_mode(mut self, cache_mode: CacheMode) -> Self {
        self.cache_mode = cache_mode;
        self
    }

    pub fn with_field_priority(mut self, fields: PriceFieldPriority) -> Self {
        self.fields = fields;
        self
    }

    pub fn cache(&self) -> Option<&SeriesCache> {
        self.cache.as_ref()
    }

    pub fn field_priority(&self) -> &PriceFieldPriority {
        &self.fields
    }

    /// Load the daily series of `ticker` over `[start, end]`; `None` bounds are open.
    ///
    /// # Errors
    ///
    /// - [`LoadError::InvalidRange`] when `start > end`, raised before any fetch
    /// - [`LoadError::InvalidTicker`] when the ticker fails validation
    /// - [`LoadError::Network`] when the provider call fails
    /// - [`LoadError::MissingPriceField`] when no acceptable price column exists
    /// - [`LoadError::EmptyResult`] when nothing is left to return
    /// - [`LoadError::InvalidPrice`] when the provider sent a non-positive price
    pub async fn load(
        &self,
        ticker: &str,
        start: Option<TradeDate>,
        end: Option<TradeDate>,
    ) -> Result<Arc<PriceSeries>, LoadError> {
        let range = DateRange::new(start, end).map_err(|_| LoadError::InvalidRange {
            start: start.map(TradeDate::format_iso).unwrap_or_default(),
            end: end.map(TradeDate::format_iso).unwrap_or_default(),
        })?;
        let ticker = Ticker::parse(ticker).map_err(LoadError::InvalidTicker)?;

        self.load_key(LoadKey::new(ticker, range)).await
    }

    /// Same as [`load`](Self::load) with already-validated arguments.
    pub async fn load_key(&self, key: LoadKey) -> Result<Arc<PriceSeries>, LoadError> {
        let cache = self.cache.as_ref().filter(|_| self.cache_mode != CacheMode::Bypass);

        if self.cache_mode == CacheMode::Use {
            if let Some(cache) = cache {
                if let Some(series) = cache.get(&key).await {
                    debug!(ticker = %key.ticker, range = %key.range, "served series from cache");
                    return Ok(series);
                }
            }
        }

        debug!(
            provider = self.provider.name(),
            ticker = %key.ticker,
            range = %key.range,
            "fetching price history"
        );
        let table = self
            .provider
            .fetch_history(HistoryRequest::new(key.ticker.clone(), key.range))
            .await?;

        let series = Arc::new(normalize(&key.ticker, &key.range, &table, &self.fields)?);
        info!(
            provider = self.provider.name(),
            ticker = %key.ticker,
            range = %key.range,
            rows = series.len(),
            gaps = series.gap_count(),
            "loaded price series"
        );

        if let Some(cache) = cache {
            cache.put(key, Arc::clone(&series)).await;
        }

        Ok(series)
    }
}

/// Reshape a provider table into a canonical series.
///
/// Null and NaN values become gaps. When several timestamps fall on the same
/// calendar date the latest one is kept.
pub fn normalize(
    ticker: &Ticker,
    range: &DateRange,
    table: &RawPriceTable,
    fields: &PriceFieldPriority,
) -> Result<PriceSeries, LoadError> {
    if table.is_empty() {
        return Err(empty_result(ticker, range));
    }

    let (field, values) = fields
        .select(table)
        .ok_or_else(|| LoadError::MissingPriceField {
            ticker: ticker.to_string(),
            tried: fields.fields().to_vec(),
            available: table.column_names(),
        })?;
    debug!(%ticker, field, "selected price field");

    let mut rows: Vec<(TradeDate, OffsetDateTime, Option<f64>)> = table
        .index()
        .iter()
        .zip(values)
        .map(|(&timestamp, &value)| {
            (
                TradeDate::from_datetime(timestamp),
                timestamp,
                value.filter(|v| !v.is_nan()),
            )
        })
        .filter(|(date, _, _)| range.contains(*date))
        .collect();
    rows.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

    let mut points: Vec<PricePoint> = Vec::with_capacity(rows.len());
    for (date, _, price) in rows {
        let point = PricePoint::new(date, price).map_err(LoadError::InvalidPrice)?;
        match points.last_mut() {
            Some(last) if last.date == date => *last = point,
            _ => points.push(point),
        }
    }

    if points.is_empty() {
        return Err(empty_result(ticker, range));
    }

    PriceSeries::new(ticker.clone(), points).map_err(LoadError::InvalidPrice)
}

fn empty_result(ticker: &Ticker, range: &DateRange) -> LoadError {
    LoadError::EmptyResult {
        ticker: ticker.to_string(),
        range: range.to_string(),
    }
}
