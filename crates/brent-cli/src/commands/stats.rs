use brent_core::{DateRange, PriceSeries};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::cli::StatsArgs;
use crate::error::CliError;
use crate::output::{format_price, Table};
use crate::stats::{yearly_stats, Metric};

use super::{parse_date, CommandResult};

#[derive(Debug, Serialize)]
struct StatsResponseData<'a> {
    ticker: &'a str,
    window: String,
    metrics: &'a [Metric],
    years: Vec<Value>,
}

pub fn run(args: &StatsArgs, series: &PriceSeries) -> Result<CommandResult, CliError> {
    let window = DateRange::new(parse_date(args.from.as_deref())?, parse_date(args.to.as_deref())?)?;
    let visible = series.within(&window);
    let stats = yearly_stats(&visible);

    let mut table = Table::new(
        std::iter::once(String::from("year"))
            .chain(args.metric.iter().map(ToString::to_string))
            .chain(std::iter::once(String::from("days"))),
    );
    let mut years = Vec::with_capacity(stats.len());
    for year in &stats {
        let mut row = vec![year.year.to_string()];
        let mut record = Map::new();
        record.insert(String::from("year"), Value::from(year.year));
        for metric in &args.metric {
            let value = year.value(*metric);
            row.push(format_price(Some(value)));
            record.insert(metric.to_string(), Value::from(value));
        }
        row.push(year.observations.to_string());
        record.insert(String::from("observations"), Value::from(year.observations));
        table.push_row(row);
        years.push(Value::Object(record));
    }

    let data = serde_json::to_value(StatsResponseData {
        ticker: series.ticker().as_str(),
        window: window.to_string(),
        metrics: &args.metric,
        years,
    })?;

    Ok(CommandResult::new(data, table))
}
