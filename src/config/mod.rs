//! Application settings, credentials and the watchlist

pub mod loader;
pub mod types;

pub use loader::{load_config, load_config_from, load_watchlist, parse_watchlist};
pub use types::{AppConfig, BuyRule, Credentials, InstrumentConfig, SellRule};
