//! Upstream market-data contract.
//!
//! A [`PriceProvider`] returns the provider's own table shape
//! ([`RawPriceTable`]): a timestamp index plus whatever named columns the
//! provider emits. Turning that into a canonical series is the loader's job.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use time::OffsetDateTime;

use crate::{DateRange, Ticker, ValidationError};

/// Column names used by Yahoo-style daily history tables.
pub mod columns {
    pub const OPEN: &str = "Open";
    pub const HIGH: &str = "High";
    pub const LOW: &str = "Low";
    pub const CLOSE: &str = "Close";
    pub const ADJ_CLOSE: &str = "Adj Close";
    pub const VOLUME: &str = "Volume";
}

/// Provider-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// The request never produced an HTTP response.
    Transport,
    /// Non-success HTTP status other than the ones below.
    Status,
    RateLimited,
    /// The provider does not know the ticker.
    NotFound,
    /// The response could not be understood.
    Malformed,
}

/// Structured provider error, shaped like the router-facing source errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    kind: ProviderErrorKind,
    message: String,
    retryable: bool,
}

impl ProviderError {
    pub fn transport(message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind: ProviderErrorKind::Transport,
            message: message.into(),
            retryable,
        }
    }

    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Status,
            message: message.into(),
            retryable: status >= 500 || status == 408,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::NotFound,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Malformed,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> ProviderErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            ProviderErrorKind::Transport => "provider.transport",
            ProviderErrorKind::Status => "provider.status",
            ProviderErrorKind::RateLimited => "provider.rate_limited",
            ProviderErrorKind::NotFound => "provider.not_found",
            ProviderErrorKind::Malformed => "provider.malformed",
        }
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for ProviderError {}

/// Daily history request for a single ticker.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HistoryRequest {
    pub ticker: Ticker,
    pub range: DateRange,
}

impl HistoryRequest {
    pub fn new(ticker: Ticker, range: DateRange) -> Self {
        Self { ticker, range }
    }
}

/// Provider table: a timestamp index and equally long named columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawPriceTable {
    index: Vec<OffsetDateTime>,
    columns: BTreeMap<String, Vec<Option<f64>>>,
}

impl RawPriceTable {
    pub fn new(index: Vec<OffsetDateTime>) -> Self {
        Self {
            index,
            columns: BTreeMap::new(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Attach a column; it must have exactly one value per index entry.
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        values: Vec<Option<f64>>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if values.len() != self.index.len() {
            return Err(ValidationError::ColumnLengthMismatch {
                column: name,
                len: values.len(),
                expected: self.index.len(),
            });
        }
        self.columns.insert(name, values);
        Ok(self)
    }

    pub fn index(&self) -> &[OffsetDateTime] {
        &self.index
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Upstream daily-history source.
///
/// Implementations must be `Send + Sync`; a loader may be shared between tasks.
pub trait PriceProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Fetch raw daily observations for `request.ticker` over `request.range`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the transport fails, the provider
    /// answers with a non-success status, or the payload cannot be parsed.
    fn fetch_history<'a>(
        &'a self,
        request: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<RawPriceTable, ProviderError>> + Send + 'a>>;
}

/// In-memory provider serving a fixed table or error; used offline and in tests.
#[derive(Debug)]
pub struct StaticProvider {
    response: Result<RawPriceTable, ProviderError>,
    calls: AtomicUsize,
    requests: Mutex<Vec<HistoryRequest>>,
}

impl StaticProvider {
    pub fn new(table: RawPriceTable) -> Self {
        Self::with_response(Ok(table))
    }

    pub fn failing(error: ProviderError) -> Self {
        Self::with_response(Err(error))
    }

    fn with_response(response: Result<RawPriceTable, ProviderError>) -> Self {
        Self {
            response,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Number of `fetch_history` calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn recorded_requests(&self) -> Vec<HistoryRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl PriceProvider for StaticProvider {
    fn name(&self) -> &'static str {
        "static"
    }

    fn fetch_history<'a>(
        &'a self,
        request: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<RawPriceTable, ProviderError>> + Send + 'a>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        let response = self.response.clone();
        Box::pin(async move { response })
    }
}
