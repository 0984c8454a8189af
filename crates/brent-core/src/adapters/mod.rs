mod yahoo;

pub use yahoo::{YahooConfig, YahooProvider, DEFAULT_BASE_URL};
