//! Behavior-driven tests for the price series loader.
//!
//! These tests verify what callers observe when the provider hands back
//! well-formed, quirky, or broken daily history tables.

use std::sync::Arc;

use brent_core::provider::columns;
use brent_core::{
    LoadError, PriceFieldPriority, PriceSeriesLoader, ProviderError, ProviderErrorKind,
    RawPriceTable, StaticProvider, TradeDate,
};
use time::macros::datetime;
use time::OffsetDateTime;

fn date(value: &str) -> TradeDate {
    TradeDate::parse(value).expect("valid date")
}

/// Five January 2020 sessions stamped at New York midnight.
fn january_index() -> Vec<OffsetDateTime> {
    vec![
        datetime!(2020-01-02 0:00 -05:00),
        datetime!(2020-01-03 0:00 -05:00),
        datetime!(2020-01-06 0:00 -05:00),
        datetime!(2020-01-08 0:00 -05:00),
        datetime!(2020-01-09 0:00 -05:00),
    ]
}

fn january_table() -> RawPriceTable {
    RawPriceTable::new(january_index())
        .with_column(
            columns::CLOSE,
            vec![Some(66.25), Some(68.60), Some(68.91), Some(65.44), Some(65.37)],
        )
        .and_then(|t| {
            t.with_column(
                columns::ADJ_CLOSE,
                vec![Some(66.25), Some(68.60), Some(68.91), Some(65.44), Some(65.37)],
            )
        })
        .expect("valid table")
}

// =============================================================================
// Loader: canonical output
// =============================================================================

#[tokio::test]
async fn when_provider_returns_five_sessions_loader_returns_five_ascending_rows() {
    // Given: A provider holding five trading days of Brent history
    let provider = Arc::new(StaticProvider::new(january_table()));
    let loader = PriceSeriesLoader::new(provider.clone());

    // When: The first ten days of January 2020 are requested
    let series = loader
        .load("BZ=F", Some(date("2020-01-01")), Some(date("2020-01-10")))
        .await
        .expect("load should succeed");

    // Then: Five ascending rows come back, first to last trading day
    assert_eq!(series.len(), 5);
    assert_eq!(series.first_date(), Some(date("2020-01-02")));
    assert_eq!(series.last_date(), Some(date("2020-01-09")));
    for pair in series.points().windows(2) {
        assert!(pair[0].date < pair[1].date, "dates must strictly increase");
    }
    for point in series.points() {
        assert!(point.price.expect("no gaps expected") > 0.0);
    }
    assert_eq!(series.ticker().as_str(), "BZ=F");
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn when_ticker_is_lowercase_the_request_uses_the_normalized_ticker() {
    // Given: A provider that records requests
    let provider = Arc::new(StaticProvider::new(january_table()));
    let loader = PriceSeriesLoader::new(provider.clone());

    // When: A caller types the ticker in lowercase
    loader.load("bz=f", None, None).await.expect("load should succeed");

    // Then: The provider sees the canonical ticker and an open range
    let requests = provider.recorded_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].ticker.as_str(), "BZ=F");
    assert_eq!(requests[0].range.start(), None);
    assert_eq!(requests[0].range.end(), None);
}

#[tokio::test]
async fn when_upstream_rows_are_unsorted_loader_sorts_them() {
    // Given: A provider that returns rows in reverse order
    let mut index = january_index();
    index.reverse();
    let table = RawPriceTable::new(index)
        .with_column(
            columns::CLOSE,
            vec![Some(65.37), Some(65.44), Some(68.91), Some(68.60), Some(66.25)],
        )
        .expect("valid table");
    let loader = PriceSeriesLoader::new(Arc::new(StaticProvider::new(table)));

    // When: The series is loaded
    let series = loader.load("BZ=F", None, None).await.expect("load should succeed");

    // Then: Rows are ascending and prices stay attached to their dates
    assert_eq!(series.first_date(), Some(date("2020-01-02")));
    assert_eq!(series.points()[0].price, Some(66.25));
    assert_eq!(series.points()[4].price, Some(65.37));
}

#[tokio::test]
async fn when_timestamps_carry_an_offset_dates_keep_the_local_calendar_day() {
    // Given: Late-evening New York stamps, which are already the next day in UTC
    let table = RawPriceTable::new(vec![
        datetime!(2020-01-02 23:00 -05:00),
        datetime!(2020-01-03 23:00 -05:00),
    ])
    .with_column(columns::CLOSE, vec![Some(66.25), Some(68.60)])
    .expect("valid table");
    let loader = PriceSeriesLoader::new(Arc::new(StaticProvider::new(table)));

    // When: The series is loaded
    let series = loader.load("BZ=F", None, None).await.expect("load should succeed");

    // Then: Each date is the calendar date of the original stamp, with no zone attached
    let dates = series
        .points()
        .iter()
        .map(|p| p.date.format_iso())
        .collect::<Vec<_>>();
    assert_eq!(dates, vec!["2020-01-02", "2020-01-03"]);

    let json = serde_json::to_value(series.as_ref()).expect("serializes");
    assert_eq!(json["points"][0]["date"], "2020-01-02");
}

#[tokio::test]
async fn when_adjusted_close_exists_it_is_preferred_over_close() {
    // Given: A table where adjusted and raw closes differ
    let table = RawPriceTable::new(vec![datetime!(2020-01-02 0:00 -05:00)])
        .with_column(columns::CLOSE, vec![Some(66.25)])
        .and_then(|t| t.with_column(columns::ADJ_CLOSE, vec![Some(65.90)]))
        .expect("valid table");
    let loader = PriceSeriesLoader::new(Arc::new(StaticProvider::new(table)));

    // When: The series is loaded
    let series = loader.load("BZ=F", None, None).await.expect("load should succeed");

    // Then: The adjusted close becomes the price
    assert_eq!(series.points()[0].price, Some(65.90));
}

#[tokio::test]
async fn when_only_close_exists_loader_falls_back_to_close() {
    // Given: A provider that does not emit adjusted closes
    let table = RawPriceTable::new(january_index())
        .with_column(
            columns::CLOSE,
            vec![Some(66.25), Some(68.60), Some(68.91), Some(65.44), Some(65.37)],
        )
        .expect("valid table");
    let loader = PriceSeriesLoader::new(Arc::new(StaticProvider::new(table)));

    // When: The series is loaded
    let series = loader.load("BZ=F", None, None).await.expect("fallback should succeed");

    // Then: The close column is used as the price
    assert_eq!(series.len(), 5);
    assert_eq!(series.points()[2].price, Some(68.91));
}

#[tokio::test]
async fn when_a_custom_field_priority_is_set_the_first_listed_field_wins() {
    // Given: A table with both a settlement and a close column
    let table = january_table()
        .with_column(
            "Settle",
            vec![Some(66.00), Some(68.50), Some(68.80), Some(65.40), Some(65.30)],
        )
        .expect("valid table");
    let fields = PriceFieldPriority::new(["Settle", columns::CLOSE]).expect("valid priority");
    let loader = PriceSeriesLoader::new(Arc::new(StaticProvider::new(table)))
        .with_field_priority(fields);

    // When: The series is loaded
    let series = loader.load("BZ=F", None, None).await.expect("load should succeed");

    // Then: Settlement prices are used even though adjusted closes exist
    assert_eq!(series.points()[0].price, Some(66.00));
    assert_eq!(series.points()[4].price, Some(65.30));
    assert_eq!(loader.field_priority().fields(), ["Settle", "Close"]);
}

#[tokio::test]
async fn when_no_field_in_a_custom_priority_exists_the_error_lists_that_priority() {
    // Given: A loader that only accepts settlement prices
    let fields = PriceFieldPriority::new(["Settle"]).expect("valid priority");
    let loader = PriceSeriesLoader::new(Arc::new(StaticProvider::new(january_table())))
        .with_field_priority(fields);

    // When: The series is loaded from a close-only provider
    let result = loader.load("BZ=F", None, None).await;

    // Then: The error reports the custom list, not the default one
    match result {
        Err(LoadError::MissingPriceField { tried, available, .. }) => {
            assert_eq!(tried, vec!["Settle"]);
            assert_eq!(available, vec!["Adj Close", "Close"]);
        }
        other => panic!("expected MissingPriceField, got {other:?}"),
    }
}

#[tokio::test]
async fn when_upstream_has_null_prices_they_remain_gaps() {
    // Given: A session without a settlement value
    let table = RawPriceTable::new(january_index())
        .with_column(
            columns::CLOSE,
            vec![Some(66.25), None, Some(68.91), Some(65.44), Some(65.37)],
        )
        .expect("valid table");
    let loader = PriceSeriesLoader::new(Arc::new(StaticProvider::new(table)));

    // When: The series is loaded
    let series = loader.load("BZ=F", None, None).await.expect("load should succeed");

    // Then: The date is kept and no value is invented for it
    assert_eq!(series.len(), 5);
    assert_eq!(series.points()[1].date, date("2020-01-03"));
    assert_eq!(series.points()[1].price, None);
    assert_eq!(series.gap_count(), 1);
}

#[tokio::test]
async fn when_loaded_twice_without_cache_results_are_equal() {
    // Given: A loader with no memoization
    let provider = Arc::new(StaticProvider::new(january_table()));
    let loader = PriceSeriesLoader::new(provider.clone());

    // When: The same arguments are loaded twice
    let first = loader.load("BZ=F", None, None).await.expect("first load");
    let second = loader.load("BZ=F", None, None).await.expect("second load");

    // Then: Both calls reach the provider and agree on content
    assert_eq!(provider.calls(), 2);
    assert_eq!(first.points(), second.points());
    assert!(!Arc::ptr_eq(&first, &second));
}

// =============================================================================
// Loader: error taxonomy
// =============================================================================

#[tokio::test]
async fn when_start_is_after_end_loader_fails_before_any_fetch() {
    // Given: A provider that counts calls
    let provider = Arc::new(StaticProvider::new(january_table()));
    let loader = PriceSeriesLoader::new(provider.clone());

    // When: The range is inverted
    let error = loader
        .load("BZ=F", Some(date("2020-01-01")), Some(date("2019-01-01")))
        .await
        .expect_err("inverted range must fail");

    // Then: InvalidRange is raised and the network was never touched
    assert_eq!(
        error,
        LoadError::InvalidRange {
            start: String::from("2020-01-01"),
            end: String::from("2019-01-01"),
        }
    );
    assert_eq!(error.code(), "load.invalid_range");
    assert!(error.is_caller_error());
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn when_ticker_is_blank_loader_fails_before_any_fetch() {
    // Given: A provider that counts calls
    let provider = Arc::new(StaticProvider::new(january_table()));
    let loader = PriceSeriesLoader::new(provider.clone());

    // When: The ticker is empty
    let error = loader.load("  ", None, None).await.expect_err("must fail");

    // Then: InvalidTicker is raised without a fetch
    assert!(matches!(error, LoadError::InvalidTicker(_)));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn when_no_price_field_exists_loader_fails_without_partial_output() {
    // Given: A table with only volume data
    let table = RawPriceTable::new(january_index())
        .with_column(
            columns::VOLUME,
            vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)],
        )
        .expect("valid table");
    let loader = PriceSeriesLoader::new(Arc::new(StaticProvider::new(table)));

    // When: The series is loaded
    let result = loader.load("BZ=F", None, None).await;

    // Then: MissingPriceField names what was tried and what was available
    match result {
        Err(LoadError::MissingPriceField {
            ticker,
            tried,
            available,
        }) => {
            assert_eq!(ticker, "BZ=F");
            assert_eq!(tried, vec!["Adj Close", "Close"]);
            assert_eq!(available, vec!["Volume"]);
        }
        other => panic!("expected MissingPriceField, got {other:?}"),
    }
}

#[tokio::test]
async fn when_provider_returns_no_rows_loader_reports_empty_result() {
    // Given: A provider with nothing for the window
    let loader = PriceSeriesLoader::new(Arc::new(StaticProvider::new(RawPriceTable::empty())));

    // When: A weekend-only window is requested
    let error = loader
        .load("BZ=F", Some(date("2020-01-04")), Some(date("2020-01-05")))
        .await
        .expect_err("empty must fail");

    // Then: EmptyResult is distinguishable from other failures
    assert_eq!(error.code(), "load.empty_result");
    assert!(error.to_string().contains("[2020-01-04, 2020-01-05]"));
}

#[tokio::test]
async fn when_provider_fails_loader_surfaces_network_error() {
    // Given: A provider whose transport is down
    let loader = PriceSeriesLoader::new(Arc::new(StaticProvider::failing(
        ProviderError::transport("connection refused", true),
    )));

    // When: The series is loaded
    let error = loader.load("BZ=F", None, None).await.expect_err("must fail");

    // Then: The provider error is carried unchanged
    match error {
        LoadError::Network(inner) => {
            assert_eq!(inner.kind(), ProviderErrorKind::Transport);
            assert!(inner.message().contains("connection refused"));
        }
        other => panic!("expected Network, got {other:?}"),
    }
}

#[tokio::test]
async fn when_provider_sends_a_negative_price_load_fails() {
    // Given: A corrupt settlement value
    let table = RawPriceTable::new(january_index())
        .with_column(
            columns::CLOSE,
            vec![Some(66.25), Some(-37.63), Some(68.91), Some(65.44), Some(65.37)],
        )
        .expect("valid table");
    let loader = PriceSeriesLoader::new(Arc::new(StaticProvider::new(table)));

    // When: The series is loaded
    let error = loader.load("BZ=F", None, None).await.expect_err("must fail");

    // Then: The whole load fails instead of returning a partial series
    assert_eq!(error.code(), "load.invalid_price");
    assert!(error.to_string().contains("2020-01-03"));
}
