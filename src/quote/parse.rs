//! Parsing of the provider's delimited quote line
//!
//! The provider answers with one JavaScript assignment per symbol:
//!
//! ```text
//! var hq_str_sh510500="CSI500 ETF,5.987,6.140,6.002,...";
//! ```
//!
//! Field 0 is the display name. The current price sits at a
//! market-dependent offset (see [`Market::price_field_index`]).

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::common::errors::{Result, WatcherError};
use crate::common::types::{Market, Quote};

/// Minimum number of comma-separated fields in a usable line
pub const MIN_FIELDS: usize = 4;

/// Extract a [`Quote`] from the raw response text for `symbol`
pub fn parse_quote_line(symbol: &str, text: &str) -> Result<Quote> {
    let market = Market::from_symbol(symbol)
        .ok_or_else(|| WatcherError::quote_unavailable(symbol, "unsupported market prefix"))?;

    let content = text.trim();
    if content.is_empty() || !content.contains('=') {
        return Err(WatcherError::quote_unavailable(symbol, "empty response"));
    }

    let start = content
        .find('"')
        .ok_or_else(|| WatcherError::quote_unavailable(symbol, "no quoted payload"))?
        + 1;
    let end = content.rfind('"').unwrap_or(0);
    if end <= start {
        return Err(WatcherError::quote_unavailable(symbol, "empty payload"));
    }

    let fields: Vec<&str> = content[start..end].split(',').collect();
    if fields.len() < MIN_FIELDS {
        return Err(WatcherError::quote_unavailable(
            symbol,
            format!("expected at least {} fields, got {}", MIN_FIELDS, fields.len()),
        ));
    }

    let raw_price = fields[market.price_field_index()].trim();
    let price = Decimal::from_str(raw_price).map_err(|e| {
        WatcherError::quote_unavailable(symbol, format!("invalid price {:?}: {}", raw_price, e))
    })?;
    if price <= Decimal::ZERO {
        return Err(WatcherError::quote_unavailable(
            symbol,
            format!("non-positive price {}", price),
        ));
    }

    Ok(Quote::new(symbol, fields[0].trim(), price))
}
