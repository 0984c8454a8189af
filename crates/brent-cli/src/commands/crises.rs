use brent_core::PriceSeries;
use serde::Serialize;

use crate::crises::{annotate, CrisisReading};
use crate::error::CliError;
use crate::output::{format_price, Table};

use super::CommandResult;

#[derive(Debug, Serialize)]
struct CrisesResponseData<'a> {
    ticker: &'a str,
    crises: &'a [CrisisReading],
}

pub fn run(series: &PriceSeries) -> Result<CommandResult, CliError> {
    let readings = annotate(series);

    let mut table = Table::new(["crisis", "marker", "observed", "price"]);
    for reading in &readings {
        table.push_row(vec![
            reading.label.to_owned(),
            reading.marker_date.format_iso(),
            reading
                .observed_date
                .map_or_else(|| String::from("-"), |date| date.format_iso()),
            format_price(reading.price),
        ]);
    }

    let data = serde_json::to_value(CrisesResponseData {
        ticker: series.ticker().as_str(),
        crises: &readings,
    })?;

    Ok(CommandResult::new(data, table))
}
