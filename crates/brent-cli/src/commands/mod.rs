mod crises;
mod history;
mod stats;

use std::sync::Arc;

use brent_core::{
    PriceProvider, PriceSeries, PriceSeriesLoader, RetryConfig, RetryingProvider, TradeDate,
    YahooConfig, YahooProvider,
};
use serde_json::Value;
use tracing::debug;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::output::Table;

pub struct CommandResult {
    pub data: Value,
    pub table: Table,
}

impl CommandResult {
    pub fn new(data: Value, table: Table) -> Self {
        Self { data, table }
    }
}

pub async fn run(cli: &Cli) -> Result<CommandResult, CliError> {
    let start = parse_date(cli.start.as_deref())?;
    let end = parse_date(cli.end.as_deref())?;

    let loader = build_loader(cli);
    let series = loader.load(&cli.ticker, start, end).await?;

    match &cli.command {
        Command::History(args) => history::run(args, &series),
        Command::Stats(args) => stats::run(args, &series),
        Command::Crises => crises::run(&series),
    }
}

pub fn build_loader(cli: &Cli) -> PriceSeriesLoader {
    let mut config = YahooConfig::from_env();
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url.as_str());
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config = config.with_timeout_ms(timeout_ms);
    }
    debug!(base_url = %config.base_url, timeout_ms = config.timeout_ms, "configured yahoo provider");

    let yahoo = YahooProvider::new(config);
    let provider: Arc<dyn PriceProvider> = if cli.retries > 0 {
        Arc::new(RetryingProvider::new(yahoo, RetryConfig::exponential(cli.retries)))
    } else {
        Arc::new(yahoo)
    };

    PriceSeriesLoader::new(provider)
}

pub(crate) fn parse_date(raw: Option<&str>) -> Result<Option<TradeDate>, CliError> {
    raw.map(TradeDate::parse).transpose().map_err(CliError::from)
}

pub(crate) fn series_summary(series: &PriceSeries) -> String {
    match (series.first_date(), series.last_date()) {
        (Some(first), Some(last)) => format!(
            "{} {} rows ({} gaps) from {first} to {last}",
            series.ticker(),
            series.len(),
            series.gap_count()
        ),
        _ => format!("{} no rows", series.ticker()),
    }
}
