//! # Brent Core
//!
//! Loading and normalization of daily price history for the Brent crude
//! dashboards.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Provider adapters (Yahoo Finance chart API) |
//! | [`cache`] | Memo cache keyed by load arguments |
//! | [`domain`] | Ticker, date, range and series types |
//! | [`error`] | Validation and load errors |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`loader`] | [`PriceSeriesLoader`] and normalization |
//! | [`provider`] | Upstream contract and raw table shape |
//! | [`retry`] | Opt-in retry wrapper for providers |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use brent_core::{PriceSeriesLoader, SeriesCache, TradeDate, YahooConfig, YahooProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = Arc::new(YahooProvider::new(YahooConfig::from_env()));
//!     let loader = PriceSeriesLoader::new(provider).with_cache(SeriesCache::unbounded());
//!
//!     let start = TradeDate::parse("2020-01-01")?;
//!     let end = TradeDate::parse("2020-01-10")?;
//!     let series = loader.load("BZ=F", Some(start), Some(end)).await?;
//!
//!     for point in series.points() {
//!         println!("{} {:?}", point.date, point.price);
//!     }
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cache;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod loader;
pub mod provider;
pub mod retry;

pub use adapters::{YahooConfig, YahooProvider};
pub use cache::{CacheMode, LoadKey, SeriesCache};
pub use domain::{DateRange, PricePoint, PriceSeries, Ticker, TradeDate};
pub use error::{LoadError, ValidationError};
pub use http_client::{HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use loader::{normalize, PriceFieldPriority, PriceSeriesLoader};
pub use provider::{
    HistoryRequest, PriceProvider, ProviderError, ProviderErrorKind, RawPriceTable, StaticProvider,
};
pub use retry::{Backoff, RetryConfig, RetryingProvider};

/// Brent crude futures on Yahoo Finance.
pub const BRENT_TICKER: &str = "BZ=F";
