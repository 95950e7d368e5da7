//! Rendering helpers shared by the report and the push payloads

use rust_decimal::Decimal;

use super::types::Market;

/// Placeholder rendered for values that could not be determined
pub const NOT_AVAILABLE: &str = "N/A";

/// Render a price with three decimals and the market's currency symbol
pub fn format_price(price: Option<Decimal>, market: Option<Market>) -> String {
    match price {
        Some(p) => {
            let symbol = market.map(|m| m.currency_symbol()).unwrap_or("");
            format!("{}{:.3}", symbol, p.round_dp(3))
        }
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Render a percent change signed, with two decimals (`+10.00%`, `-3.25%`)
pub fn format_percent(percent: Option<Decimal>) -> String {
    match percent {
        Some(p) => {
            let rounded = p.round_dp(2);
            if rounded < Decimal::ZERO {
                format!("-{:.2}%", rounded.abs())
            } else {
                format!("+{:.2}%", rounded.abs())
            }
        }
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Keep at most `max_chars` characters; appends `...` when something was cut
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// First `max_chars` characters, without an ellipsis
pub fn take_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
