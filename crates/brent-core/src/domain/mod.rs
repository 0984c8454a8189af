//! # Domain Models
//!
//! Canonical types for daily price data.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Ticker`] | Validated instrument symbol (`BZ=F`, `^GSPC`) |
//! | [`TradeDate`] | Timezone-naive calendar date |
//! | [`DateRange`] | Inclusive window with optional bounds |
//! | [`PricePoint`] | One dated observation, possibly a gap |
//! | [`PriceSeries`] | Ascending, duplicate-free series of points |
//!
//! All types validate their invariants at construction time.

mod range;
mod series;
mod ticker;
mod trade_date;

pub use range::DateRange;
pub use series::{PricePoint, PriceSeries};
pub use ticker::Ticker;
pub use trade_date::TradeDate;
