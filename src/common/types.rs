//! Types shared by the quote source, decision engine and report

use chrono::{DateTime, Local};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Listing market, derived from the exchange prefix of a symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Market {
    /// Shanghai exchange (`sh510500`)
    Shanghai,
    /// Shenzhen exchange (`sz159901`)
    Shenzhen,
    /// US listing quoted through the foreign feed (`gb_aapl`)
    Us,
}

impl Market {
    /// Detect the market from an exchange-qualified symbol
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let lower = symbol.to_ascii_lowercase();
        if lower.starts_with("gb_") {
            Some(Market::Us)
        } else if lower.starts_with("sh") {
            Some(Market::Shanghai)
        } else if lower.starts_with("sz") {
            Some(Market::Shenzhen)
        } else {
            None
        }
    }

    /// Index of the "current price" field in the provider's quote line
    pub fn price_field_index(&self) -> usize {
        match self {
            Market::Shanghai | Market::Shenzhen => 3,
            Market::Us => 1,
        }
    }

    /// Currency symbol used when rendering prices
    pub fn currency_symbol(&self) -> &'static str {
        match self {
            Market::Shanghai | Market::Shenzhen => "¥",
            Market::Us => "$",
        }
    }
}

impl std::fmt::Display for Market {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Market::Shanghai => write!(f, "sh"),
            Market::Shenzhen => write!(f, "sz"),
            Market::Us => write!(f, "gb"),
        }
    }
}

/// A freshly fetched price for one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Exchange-qualified symbol the quote was requested for
    pub symbol: String,
    /// Display name reported by the provider
    pub name: String,
    /// Current price, always > 0
    pub price: Decimal,
    /// Local time the quote was fetched
    pub timestamp: DateTime<Local>,
}

impl Quote {
    pub fn new(symbol: impl Into<String>, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            price,
            timestamp: Local::now(),
        }
    }

    pub fn market(&self) -> Option<Market> {
        Market::from_symbol(&self.symbol)
    }
}
