//! Yahoo-style instrument tickers.
//!
//! | Shape | Example | Meaning |
//! |-------|---------|---------|
//! | `ROOT=F` | `BZ=F` | continuous front-month futures |
//! | `^ROOT` | `^GSPC` | index level |
//! | `PAIR=X` | `EURUSD=X` | currency pair |
//! | `ROOT.EX` / `ROOT-CLASS` | `SHEL.L`, `BRK-B` | listed shares |

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_TICKER_LEN: usize = 15;

/// Uppercased ticker as the chart API expects it.
///
/// `^` may only lead the ticker and `=` may appear once, between the root and
/// its market suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let ticker = input.trim().to_ascii_uppercase();
        let len = ticker.chars().count();
        match len {
            0 => return Err(ValidationError::EmptyTicker),
            len if len > MAX_TICKER_LEN => {
                return Err(ValidationError::TickerTooLong {
                    len,
                    max: MAX_TICKER_LEN,
                })
            }
            _ => {}
        }

        let mut suffix_at = None;
        for (index, ch) in ticker.chars().enumerate() {
            match ch {
                '^' if index == 0 => {}
                _ if index == 0 && !ch.is_ascii_alphabetic() => {
                    return Err(ValidationError::TickerInvalidStart { ch });
                }
                '=' if suffix_at.is_none() => suffix_at = Some(index),
                '.' | '-' => {}
                _ if ch.is_ascii_alphanumeric() => {}
                _ => return Err(ValidationError::TickerInvalidChar { ch, index }),
            }
        }

        // A root without its market suffix (`BZ=`) is rejected at the `=`.
        if suffix_at == Some(len - 1) {
            return Err(ValidationError::TickerInvalidChar {
                ch: '=',
                index: len - 1,
            });
        }

        Ok(Self(ticker))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Ticker {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Ticker {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Ticker> for String {
    fn from(value: Ticker) -> Self {
        value.0
    }
}
