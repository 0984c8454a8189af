use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use chrono::{DateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use time::{OffsetDateTime, UtcOffset};
use tracing::{debug, warn};

use crate::http_client::{HttpAuth, HttpClient, HttpRequest, ReqwestHttpClient};
use crate::provider::{
    columns, HistoryRequest, PriceProvider, ProviderError, RawPriceTable,
};

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Connection settings for the Yahoo chart endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YahooConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub auth: HttpAuth,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: String::from(DEFAULT_BASE_URL),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            auth: HttpAuth::None,
        }
    }
}

impl YahooConfig {
    /// Defaults overridden by `BRENT_YAHOO_BASE_URL`, `BRENT_HTTP_TIMEOUT_MS`
    /// and `YAHOO_COOKIE` when set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(base_url) = lookup("BRENT_YAHOO_BASE_URL").filter(|v| !v.trim().is_empty()) {
            config.base_url = base_url.trim().trim_end_matches('/').to_owned();
        }
        if let Some(timeout_ms) = lookup("BRENT_HTTP_TIMEOUT_MS").and_then(|v| v.trim().parse().ok())
        {
            config.timeout_ms = timeout_ms;
        }
        if let Some(cookie) = lookup("YAHOO_COOKIE").filter(|v| !v.trim().is_empty()) {
            config.auth = HttpAuth::Cookie(cookie);
        }
        config
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// Daily history from Yahoo Finance's v8 chart API.
#[derive(Clone)]
pub struct YahooProvider {
    http_client: Arc<dyn HttpClient>,
    config: YahooConfig,
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new(YahooConfig::default())
    }
}

impl YahooProvider {
    pub fn new(config: YahooConfig) -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()), config)
    }

    pub fn with_http_client(http_client: Arc<dyn HttpClient>, config: YahooConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }

    pub fn config(&self) -> &YahooConfig {
        &self.config
    }

    /// Chart URL for a request. The end bound is inclusive, Yahoo's `period2`
    /// is exclusive, so it points at the following midnight.
    pub fn chart_url(&self, request: &HistoryRequest) -> String {
        let period1 = request
            .range
            .start()
            .map_or(0, |start| start.unix_midnight_utc());
        let period2 = request
            .range
            .end()
            .and_then(|end| end.next_day())
            .map_or_else(
                || OffsetDateTime::now_utc().unix_timestamp(),
                |after_end| after_end.unix_midnight_utc(),
            );

        format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&events=div%2Csplits&includeAdjustedClose=true",
            self.config.base_url,
            urlencoding::encode(request.ticker.as_str()),
            period1,
            period2,
        )
    }

    async fn fetch_chart(&self, request: HistoryRequest) -> Result<RawPriceTable, ProviderError> {
        let url = self.chart_url(&request);
        debug!(ticker = %request.ticker, %url, "requesting yahoo chart");

        let http_request = HttpRequest::get(&url)
            .with_header("referer", "https://finance.yahoo.com/")
            .with_auth(&self.config.auth)
            .with_timeout_ms(self.config.timeout_ms);

        let response = self.http_client.execute(http_request).await.map_err(|error| {
            warn!(ticker = %request.ticker, error = %error, "yahoo transport failure");
            ProviderError::transport(
                format!("yahoo transport error: {}", error.message()),
                error.retryable(),
            )
        })?;

        if response.is_success() {
            return parse_chart(&response.body);
        }

        match response.status {
            404 => {
                let detail = chart_error_description(&response.body)
                    .unwrap_or_else(|| String::from("no data found"));
                Err(ProviderError::not_found(format!(
                    "yahoo has no chart for {}: {detail}",
                    request.ticker
                )))
            }
            429 => {
                warn!(ticker = %request.ticker, "yahoo rate limited the chart request");
                Err(ProviderError::rate_limited("yahoo returned status 429"))
            }
            status => {
                warn!(ticker = %request.ticker, status, "yahoo chart request failed");
                Err(ProviderError::status(
                    status,
                    format!("yahoo returned status {status}"),
                ))
            }
        }
    }
}

impl PriceProvider for YahooProvider {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    fn fetch_history<'a>(
        &'a self,
        request: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<RawPriceTable, ProviderError>> + Send + 'a>> {
        Box::pin(self.fetch_chart(request))
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl ChartError {
    fn describe(&self) -> String {
        match (&self.code, &self.description) {
            (Some(code), Some(description)) => format!("{code}: {description}"),
            (Some(code), None) => code.clone(),
            (None, Some(description)) => description.clone(),
            (None, None) => String::from("unknown error"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    #[serde(default)]
    indicators: ChartIndicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    /// Offset of the exchange when the chart was requested.
    #[serde(default)]
    gmtoffset: i32,
    #[serde(default, rename = "exchangeTimezoneName")]
    exchange_timezone_name: Option<String>,
}

/// How bar timestamps are placed in exchange-local time.
///
/// Daily bars are stamped at exchange midnight, so the offset has to be the
/// one in force on the bar's own date. A single request-time `gmtoffset`
/// pushes bars from the other side of a DST change onto the previous day;
/// it is only used when the exchange zone is missing or unknown.
#[derive(Debug, Clone, Copy)]
enum BarOffset {
    Zone(Tz),
    Fixed(UtcOffset),
}

impl BarOffset {
    fn from_meta(meta: &ChartMeta) -> Result<Self, ProviderError> {
        if let Some(name) = meta.exchange_timezone_name.as_deref() {
            match name.parse::<Tz>() {
                Ok(zone) => return Ok(Self::Zone(zone)),
                Err(_) => warn!(zone = name, "unknown exchange timezone, using gmtoffset"),
            }
        }

        UtcOffset::from_whole_seconds(meta.gmtoffset)
            .map(Self::Fixed)
            .map_err(|_| {
                ProviderError::malformed(format!(
                    "yahoo gmtoffset {} is out of range",
                    meta.gmtoffset
                ))
            })
    }

    fn localize(self, unix_seconds: i64) -> Result<OffsetDateTime, ProviderError> {
        let invalid = || ProviderError::malformed(format!("invalid yahoo timestamp {unix_seconds}"));
        let instant = OffsetDateTime::from_unix_timestamp(unix_seconds).map_err(|_| invalid())?;

        let offset = match self {
            Self::Fixed(offset) => offset,
            Self::Zone(zone) => {
                let utc = DateTime::<Utc>::from_timestamp(unix_seconds, 0).ok_or_else(invalid)?;
                let seconds = zone
                    .offset_from_utc_datetime(&utc.naive_utc())
                    .fix()
                    .local_minus_utc();
                UtcOffset::from_whole_seconds(seconds).map_err(|_| invalid())?
            }
        };

        Ok(instant.to_offset(offset))
    }
}

#[derive(Debug, Default, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
    #[serde(default)]
    adjclose: Vec<ChartAdjClose>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Option<Vec<Option<f64>>>,
    #[serde(default)]
    high: Option<Vec<Option<f64>>>,
    #[serde(default)]
    low: Option<Vec<Option<f64>>>,
    #[serde(default)]
    close: Option<Vec<Option<f64>>>,
    #[serde(default)]
    volume: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
struct ChartAdjClose {
    #[serde(default)]
    adjclose: Option<Vec<Option<f64>>>,
}

fn chart_error_description(body: &str) -> Option<String> {
    serde_json::from_str::<ChartResponse>(body)
        .ok()
        .and_then(|response| response.chart.error)
        .map(|error| error.describe())
}

/// Turn a chart payload into a raw table whose index is in exchange-local time.
fn parse_chart(body: &str) -> Result<RawPriceTable, ProviderError> {
    let response: ChartResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::malformed(format!("failed to parse yahoo chart: {e}")))?;

    if let Some(error) = response.chart.error {
        let message = error.describe();
        return Err(if error.code.as_deref() == Some("Not Found") {
            ProviderError::not_found(format!("yahoo chart error: {message}"))
        } else {
            ProviderError::malformed(format!("yahoo chart error: {message}"))
        });
    }

    let result = response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| ProviderError::malformed("yahoo chart response has no result"))?;

    let Some(timestamps) = result.timestamp else {
        // Yahoo omits `timestamp` entirely for windows without trading days.
        return Ok(RawPriceTable::empty());
    };

    let offset = BarOffset::from_meta(&result.meta)?;
    let index = timestamps
        .iter()
        .map(|&ts| offset.localize(ts))
        .collect::<Result<Vec<_>, _>>()?;

    let mut table = RawPriceTable::new(index);
    if let Some(quote) = result.indicators.quote.into_iter().next() {
        for (name, values) in [
            (columns::OPEN, quote.open),
            (columns::HIGH, quote.high),
            (columns::LOW, quote.low),
            (columns::CLOSE, quote.close),
            (columns::VOLUME, quote.volume),
        ] {
            if let Some(values) = values {
                table = attach(table, name, values)?;
            }
        }
    }
    if let Some(adjclose) = result
        .indicators
        .adjclose
        .into_iter()
        .next()
        .and_then(|entry| entry.adjclose)
    {
        table = attach(table, columns::ADJ_CLOSE, adjclose)?;
    }

    Ok(table)
}

fn attach(
    table: RawPriceTable,
    name: &str,
    values: Vec<Option<f64>>,
) -> Result<RawPriceTable, ProviderError> {
    table
        .with_column(name, values)
        .map_err(|error| ProviderError::malformed(format!("yahoo chart: {error}")))
}
