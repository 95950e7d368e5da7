//! Common test utilities and fixtures

#![allow(dead_code)]

use rust_decimal_macros::dec;
use serde_json::Value;
use stock_watcher::config::types::{BuyRule, InstrumentConfig, SellRule};
use wiremock::{Match, Request};

/// Watchlist entry from the worked example: base 6.000, buy 5.500,
/// sell 25% at +10% and 50% at +20%
pub fn sample_instrument() -> InstrumentConfig {
    InstrumentConfig {
        name: "CSI 500 ETF".to_string(),
        code: "sh510500".to_string(),
        base_price: dec!(6.000),
        buy_price: Some(dec!(5.500)),
        buy_rules: Vec::new(),
        sell_rules: vec![
            SellRule::new(dec!(10), dec!(25)),
            SellRule::new(dec!(20), dec!(50)),
        ],
        note: "mid-cap core holding".to_string(),
    }
}

/// A US listing with tiered buys
pub fn sample_us_instrument() -> InstrumentConfig {
    InstrumentConfig {
        name: "Apple".to_string(),
        code: "gb_aapl".to_string(),
        base_price: dec!(200),
        buy_price: None,
        buy_rules: vec![
            BuyRule::new(dec!(5), dec!(10)),
            BuyRule::new(dec!(10), dec!(20)),
        ],
        sell_rules: vec![SellRule::new(dec!(15), dec!(30))],
        note: String::new(),
    }
}

/// Matches template sends whose field map contains `field`
pub struct HasTemplateField(pub &'static str);

impl Match for HasTemplateField {
    fn matches(&self, request: &Request) -> bool {
        serde_json::from_slice::<Value>(&request.body)
            .ok()
            .and_then(|body| body.get("data").and_then(|d| d.get(self.0)).cloned())
            .is_some()
    }
}

/// Matches template sends addressed to `touser`
pub struct ToUser(pub &'static str);

impl Match for ToUser {
    fn matches(&self, request: &Request) -> bool {
        serde_json::from_slice::<Value>(&request.body)
            .ok()
            .and_then(|body| body.get("touser").and_then(Value::as_str).map(|u| u == self.0))
            .unwrap_or(false)
    }
}

/// Sample provider responses
pub mod quote_lines {
    pub const ETF_AT_6_600: &str =
        r#"var hq_str_sh510500="CSI500 ETF,6.500,6.000,6.600,6.650,6.480,6.599,6.600,1234567,8123456.000";"#;

    pub const AAPL_AT_180: &str =
        r#"var hq_str_gb_aapl="Apple,180.0000,-10.00,2024-03-01 09:30:00,-20.00";"#;

    pub const EMPTY: &str = r#"var hq_str_sh510500="";"#;
}

/// Sample push API responses
pub mod api_responses {
    pub const TOKEN: &str = r#"{"access_token":"ACCESS_TOKEN","expires_in":7200}"#;

    pub const TOKEN_ERROR: &str = r#"{"errcode":40125,"errmsg":"invalid appsecret"}"#;

    pub const SEND_OK: &str = r#"{"errcode":0,"errmsg":"ok","msgid":200228332}"#;

    pub const FIELD_MISMATCH: &str = r#"{"errcode":40001,"errmsg":"invalid template field"}"#;

    pub const NOT_SUBSCRIBED: &str = r#"{"errcode":43004,"errmsg":"require subscribe"}"#;

    pub const UNRECOGNIZED: &str = r#"{"unexpected":"shape"}"#;
}
