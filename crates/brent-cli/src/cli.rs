//! CLI argument definitions for brent.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `history` | Print the normalized daily series |
//! | `stats` | Yearly max/min/mean over a display window |
//! | `crises` | Prices at well-known oil market crises |
//!
//! # Examples
//!
//! ```bash
//! brent history --start 2020-01-01 --end 2020-01-10
//! brent stats --from 2014-01-01 --metric mean,max
//! brent crises --format json --pretty
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::stats::Metric;

/// Brent crude oil price history from the command line.
#[derive(Debug, Parser)]
#[command(
    name = "brent",
    author,
    version,
    about = "Brent crude oil price history",
    long_about = "Loads daily Brent crude prices (Yahoo Finance, ticker BZ=F by default), \
normalizes them into one dated price per trading day, and prints history, yearly statistics \
or crisis markers.\n\
\n\
Environment:\n\
  BRENT_YAHOO_BASE_URL   chart API base URL\n\
  BRENT_HTTP_TIMEOUT_MS  request timeout\n\
  YAHOO_COOKIE           session cookie sent with requests\n\
  RUST_LOG               log filter (logs go to stderr)"
)]
pub struct Cli {
    /// Instrument ticker to load.
    #[arg(long, global = true, default_value = brent_core::BRENT_TICKER)]
    pub ticker: String,

    /// First date to load (YYYY-MM-DD). Defaults to the earliest available.
    #[arg(long, global = true)]
    pub start: Option<String>,

    /// Last date to load (YYYY-MM-DD). Defaults to the latest available.
    #[arg(long, global = true)]
    pub end: Option<String>,

    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Request timeout in milliseconds (overrides BRENT_HTTP_TIMEOUT_MS).
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Retries for transient provider failures.
    #[arg(long, global = true, default_value_t = 0)]
    pub retries: u32,

    /// Chart API base URL (overrides BRENT_YAHOO_BASE_URL).
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Log progress to stderr (ignored when RUST_LOG is set).
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text columns.
    Table,
    /// Single JSON document.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the daily price series.
    ///
    ///   brent history
    ///   brent history --start 2020-01-01 --end 2020-01-10
    ///   brent history --tail 20
    History(HistoryArgs),

    /// Yearly statistics over a display window.
    ///
    ///   brent stats
    ///   brent stats --from 2010-01-01 --to 2019-12-31 --metric max,min
    Stats(StatsArgs),

    /// Prices around the 2008, 2014 and 2020 oil market crises.
    Crises,
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Only print the most recent N rows.
    #[arg(long)]
    pub tail: Option<usize>,
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Start of the display window (YYYY-MM-DD).
    #[arg(long)]
    pub from: Option<String>,

    /// End of the display window (YYYY-MM-DD).
    #[arg(long)]
    pub to: Option<String>,

    /// Metrics to show.
    #[arg(
        long,
        value_enum,
        value_delimiter = ',',
        num_args = 1..,
        default_values_t = [Metric::Mean, Metric::Max, Metric::Min]
    )]
    pub metric: Vec<Metric>,
}
