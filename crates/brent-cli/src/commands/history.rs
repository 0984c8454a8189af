use brent_core::{PricePoint, PriceSeries};
use serde::Serialize;

use crate::cli::HistoryArgs;
use crate::error::CliError;
use crate::output::{format_price, Table};

use super::{series_summary, CommandResult};

#[derive(Debug, Serialize)]
struct HistoryResponseData<'a> {
    ticker: &'a str,
    rows: usize,
    gaps: usize,
    points: &'a [PricePoint],
}

pub fn run(args: &HistoryArgs, series: &PriceSeries) -> Result<CommandResult, CliError> {
    let points = tail(series.points(), args.tail);

    let data = serde_json::to_value(HistoryResponseData {
        ticker: series.ticker().as_str(),
        rows: points.len(),
        gaps: points.iter().filter(|point| point.is_gap()).count(),
        points,
    })?;

    let mut table = Table::new(["date", "price"]);
    for point in points {
        table.push_row(vec![point.date.format_iso(), format_price(point.price)]);
    }

    Ok(CommandResult::new(data, table.with_footer(series_summary(series))))
}

fn tail(points: &[PricePoint], count: Option<usize>) -> &[PricePoint] {
    match count {
        Some(count) => &points[points.len().saturating_sub(count)..],
        None => points,
    }
}
