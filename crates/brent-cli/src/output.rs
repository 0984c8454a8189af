use std::io::{self, Write};

use serde_json::Value;

use crate::cli::OutputFormat;
use crate::commands::CommandResult;
use crate::error::CliError;

/// Column-aligned text rendering of a command result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub footer: Vec<String>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn with_footer(mut self, line: impl Into<String>) -> Self {
        self.footer.push(line.into());
        self
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths = self.headers.iter().map(String::len).collect::<Vec<_>>();
        for row in &self.rows {
            for (index, cell) in row.iter().enumerate() {
                match widths.get_mut(index) {
                    Some(width) => *width = (*width).max(cell.len()),
                    None => widths.push(cell.len()),
                }
            }
        }
        widths
    }

    pub fn write_to(&self, out: &mut impl Write) -> io::Result<()> {
        let widths = self.widths();
        let line = |cells: &[String]| {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{cell:>width$}"))
                .collect::<Vec<_>>()
                .join("  ")
        };

        writeln!(out, "{}", line(&self.headers))?;
        writeln!(
            out,
            "{}",
            widths
                .iter()
                .map(|width| "-".repeat(*width))
                .collect::<Vec<_>>()
                .join("  ")
        )?;
        for row in &self.rows {
            writeln!(out, "{}", line(row))?;
        }
        for footer in &self.footer {
            writeln!(out, "{footer}")?;
        }
        Ok(())
    }
}

pub fn render(result: &CommandResult, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    render_to(&mut out, result, format, pretty)?;
    out.flush()?;
    Ok(())
}

pub fn render_to(
    out: &mut impl Write,
    result: &CommandResult,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => writeln!(out, "{}", to_json(&result.data, pretty)?)?,
        OutputFormat::Table => result.table.write_to(out)?,
    }
    Ok(())
}

fn to_json(value: &Value, pretty: bool) -> Result<String, CliError> {
    Ok(if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    })
}

pub fn format_price(price: Option<f64>) -> String {
    price.map_or_else(|| String::from("-"), |value| format!("{value:.2}"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample() -> CommandResult {
        let mut table = Table::new(["date", "price"]);
        table.push_row(vec![String::from("2020-01-02"), format_price(Some(66.25))]);
        table.push_row(vec![String::from("2020-01-03"), format_price(None)]);
        CommandResult {
            data: json!({"ticker": "BZ=F"}),
            table: table.with_footer("2 rows"),
        }
    }

    #[test]
    fn table_right_aligns_columns() {
        let mut buffer = Vec::new();
        render_to(&mut buffer, &sample(), OutputFormat::Table, false).expect("renders");
        let text = String::from_utf8(buffer).expect("utf8");
        let lines = text.lines().collect::<Vec<_>>();

        assert_eq!(lines[0], "      date  price");
        assert_eq!(lines[1], "----------  -----");
        assert_eq!(lines[2], "2020-01-02  66.25");
        assert_eq!(lines[3], "2020-01-03      -");
        assert_eq!(lines[4], "2 rows");
    }

    #[test]
    fn json_output_is_compact_unless_pretty() {
        let mut compact = Vec::new();
        render_to(&mut compact, &sample(), OutputFormat::Json, false).expect("renders");
        assert_eq!(String::from_utf8(compact).expect("utf8"), "{\"ticker\":\"BZ=F\"}\n");

        let mut pretty = Vec::new();
        render_to(&mut pretty, &sample(), OutputFormat::Json, true).expect("renders");
        assert!(String::from_utf8(pretty).expect("utf8").contains("\n  \"ticker\""));
    }
}
