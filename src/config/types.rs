//! Configuration types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::common::errors::{Result, WatcherError};
use crate::common::types::Market;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Quote provider configuration
    #[serde(default)]
    pub quote: QuoteConfig,
    /// Push endpoint configuration and credentials
    #[serde(default)]
    pub wechat: WeChatConfig,
    /// Path of the JSON watchlist
    #[serde(default = "default_watchlist_path")]
    pub watchlist_path: String,
    /// General application settings
    #[serde(default)]
    pub settings: AppSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            quote: QuoteConfig::default(),
            wechat: WeChatConfig::default(),
            watchlist_path: default_watchlist_path(),
            settings: AppSettings::default(),
        }
    }
}

impl AppConfig {
    /// Check endpoint URLs and timing settings
    ///
    /// Credentials are checked separately by [`WeChatConfig::credentials`]
    /// so a dry run works without them.
    pub fn validate(&self) -> Result<()> {
        validate_url("quote.base_url", &self.quote.base_url)?;
        validate_url("quote.referer", &self.quote.referer)?;
        validate_url("wechat.api_url", &self.wechat.api_url)?;
        if self.settings.request_timeout_seconds == 0 {
            return Err(WatcherError::Configuration(
                "settings.request_timeout_seconds must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn validate_url(field: &str, value: &str) -> Result<()> {
    url::Url::parse(value)
        .map(|_| ())
        .map_err(|e| WatcherError::Configuration(format!("{} is not a valid URL ({}): {}", field, value, e)))
}

fn default_watchlist_path() -> String {
    "config.json".to_string()
}

/// Quote provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteConfig {
    /// Request URL prefix; the symbol is appended verbatim
    #[serde(default = "default_quote_base_url")]
    pub base_url: String,
    /// `Referer` header the provider requires
    #[serde(default = "default_quote_referer")]
    pub referer: String,
    /// `User-Agent` header sent with each request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_quote_base_url(),
            referer: default_quote_referer(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_quote_base_url() -> String {
    "https://hq.sinajs.cn/list=".to_string()
}

fn default_quote_referer() -> String {
    "https://finance.sina.com.cn/".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string()
}

/// Templated push endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeChatConfig {
    /// Application id
    #[serde(default)]
    pub app_id: Option<String>,
    /// Application secret
    #[serde(default)]
    pub app_secret: Option<String>,
    /// Template the messages are bound to
    #[serde(default)]
    pub template_id: Option<String>,
    /// Recipient ids, in send order
    #[serde(default)]
    pub recipients: Vec<String>,
    /// Base URL of the push API
    #[serde(default = "default_wechat_api_url")]
    pub api_url: String,
}

impl Default for WeChatConfig {
    fn default() -> Self {
        Self {
            app_id: None,
            app_secret: None,
            template_id: None,
            recipients: Vec::new(),
            api_url: default_wechat_api_url(),
        }
    }
}

impl WeChatConfig {
    /// Collect the delivery credentials, failing if any is missing or blank
    pub fn credentials(&self) -> Result<Credentials> {
        let mut missing = Vec::new();
        let app_id = non_blank(&self.app_id, "WECHAT_APP_ID", &mut missing);
        let app_secret = non_blank(&self.app_secret, "WECHAT_APP_SECRET", &mut missing);
        let template_id = non_blank(&self.template_id, "WECHAT_TEMPLATE_ID", &mut missing);

        match (app_id, app_secret, template_id) {
            (Some(app_id), Some(app_secret), Some(template_id)) => Ok(Credentials {
                app_id,
                app_secret,
                template_id,
            }),
            _ => Err(WatcherError::Configuration(format!(
                "missing credentials: {}",
                missing.join(", ")
            ))),
        }
    }
}

fn non_blank(value: &Option<String>, name: &'static str, missing: &mut Vec<&'static str>) -> Option<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Some(v.to_string()),
        _ => {
            missing.push(name);
            None
        }
    }
}

fn default_wechat_api_url() -> String {
    "https://api.weixin.qq.com".to_string()
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Timeout applied to every network call, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Pause between two consecutive recipients, in milliseconds
    #[serde(default = "default_send_delay")]
    pub send_delay_ms: u64,
    /// Skip delivery when no instrument requires action
    #[serde(default)]
    pub notify_only_on_action: bool,
}

impl AppSettings {
    /// Level from the command line if given, else the configured one
    pub fn log_level_or<'a>(&'a self, flag: Option<&'a str>) -> &'a str {
        flag.unwrap_or(&self.log_level)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn send_delay(&self) -> Duration {
        Duration::from_millis(self.send_delay_ms)
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            request_timeout_seconds: default_request_timeout(),
            send_delay_ms: default_send_delay(),
            notify_only_on_action: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_send_delay() -> u64 {
    500
}

/// Long-lived credentials for the push endpoint
#[derive(Clone)]
pub struct Credentials {
    pub app_id: String,
    pub app_secret: String,
    pub template_id: String,
}

impl Credentials {
    pub fn new(app_id: String, app_secret: String, template_id: String) -> Self {
        Self {
            app_id,
            app_secret,
            template_id,
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("app_id", &self.app_id)
            .field("app_secret", &"***")
            .field("template_id", &self.template_id)
            .finish()
    }
}

/// One watchlist entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentConfig {
    pub name: String,
    /// Exchange-qualified symbol, e.g. `sh510500`
    pub code: String,
    /// Reference price percent changes are measured against
    pub base_price: Decimal,
    /// Absolute value-buy threshold
    #[serde(default)]
    pub buy_price: Option<Decimal>,
    #[serde(default)]
    pub buy_rules: Vec<BuyRule>,
    pub sell_rules: Vec<SellRule>,
    #[serde(default)]
    pub note: String,
}

impl InstrumentConfig {
    pub fn market(&self) -> Option<Market> {
        Market::from_symbol(&self.code)
    }

    /// Check the invariants every instrument must satisfy at load time
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        if self.code.trim().is_empty() {
            return Err("code must not be empty".to_string());
        }
        if self.market().is_none() {
            return Err(format!(
                "code {} has no supported market prefix (sh, sz, gb_)",
                self.code
            ));
        }
        if self.base_price <= Decimal::ZERO {
            return Err(format!("base_price must be > 0, got {}", self.base_price));
        }
        if let Some(buy_price) = self.buy_price {
            if buy_price <= Decimal::ZERO {
                return Err(format!("buy_price must be > 0, got {}", buy_price));
            }
        }
        if self.sell_rules.is_empty() {
            return Err("sell_rules must not be empty".to_string());
        }
        for (i, rule) in self.buy_rules.iter().enumerate() {
            rule.validate().map_err(|e| format!("buy_rules[{}]: {}", i, e))?;
        }
        for (i, rule) in self.sell_rules.iter().enumerate() {
            rule.validate().map_err(|e| format!("sell_rules[{}]: {}", i, e))?;
        }
        Ok(())
    }
}

/// Buy a fraction of capital once the price has dropped far enough
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyRule {
    pub trigger_percent_decrease: Decimal,
    pub buy_percent_of_capital: Decimal,
}

impl BuyRule {
    pub fn new(trigger_percent_decrease: Decimal, buy_percent_of_capital: Decimal) -> Self {
        Self {
            trigger_percent_decrease,
            buy_percent_of_capital,
        }
    }

    fn validate(&self) -> std::result::Result<(), String> {
        check_trigger("trigger_percent_decrease", self.trigger_percent_decrease)?;
        check_fraction("buy_percent_of_capital", self.buy_percent_of_capital)
    }
}

/// Sell a fraction of the position once the price has risen far enough
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellRule {
    pub trigger_percent_increase: Decimal,
    pub sell_percent_of_position: Decimal,
}

impl SellRule {
    pub fn new(trigger_percent_increase: Decimal, sell_percent_of_position: Decimal) -> Self {
        Self {
            trigger_percent_increase,
            sell_percent_of_position,
        }
    }

    fn validate(&self) -> std::result::Result<(), String> {
        check_trigger("trigger_percent_increase", self.trigger_percent_increase)?;
        check_fraction("sell_percent_of_position", self.sell_percent_of_position)
    }
}

fn check_trigger(field: &str, value: Decimal) -> std::result::Result<(), String> {
    if value <= Decimal::ZERO {
        return Err(format!("{} must be > 0, got {}", field, value));
    }
    Ok(())
}

fn check_fraction(field: &str, value: Decimal) -> std::result::Result<(), String> {
    if value <= Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(format!("{} must be in (0, 100], got {}", field, value));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn instrument() -> InstrumentConfig {
        InstrumentConfig {
            name: "CSI 500 ETF".to_string(),
            code: "sh510500".to_string(),
            base_price: dec!(6.000),
            buy_price: Some(dec!(5.500)),
            buy_rules: vec![BuyRule::new(dec!(5), dec!(20))],
            sell_rules: vec![SellRule::new(dec!(10), dec!(25))],
            note: String::new(),
        }
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.quote.base_url, "https://hq.sinajs.cn/list=");
        assert_eq!(config.wechat.api_url, "https://api.weixin.qq.com");
        assert_eq!(config.settings.send_delay(), Duration::from_millis(500));
        assert_eq!(config.settings.request_timeout(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_log_level_flag_overrides_settings() {
        let settings = AppSettings {
            log_level: "debug".to_string(),
            ..AppSettings::default()
        };
        assert_eq!(settings.log_level_or(None), "debug");
        assert_eq!(settings.log_level_or(Some("warn")), "warn");
    }

    #[test]
    fn test_invalid_url_rejected() {
        let mut config = AppConfig::default();
        config.wechat.api_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(WatcherError::Configuration(_))));
    }

    #[test]
    fn test_credentials_report_missing_fields() {
        let wechat = WeChatConfig {
            app_id: Some("wx123".to_string()),
            app_secret: Some("  ".to_string()),
            ..WeChatConfig::default()
        };
        let err = wechat.credentials().unwrap_err().to_string();
        assert!(err.contains("WECHAT_APP_SECRET"));
        assert!(err.contains("WECHAT_TEMPLATE_ID"));
        assert!(!err.contains("WECHAT_APP_ID"));
    }

    #[test]
    fn test_credentials_debug_hides_secret() {
        let creds = Credentials::new("wx123".into(), "topsecret".into(), "tmpl".into());
        assert!(!format!("{:?}", creds).contains("topsecret"));
    }

    #[test]
    fn test_valid_instrument() {
        assert!(instrument().validate().is_ok());
    }

    #[test]
    fn test_instrument_invariants() {
        let mut zero_base = instrument();
        zero_base.base_price = Decimal::ZERO;
        assert!(zero_base.validate().unwrap_err().contains("base_price"));

        let mut no_sells = instrument();
        no_sells.sell_rules.clear();
        assert!(no_sells.validate().unwrap_err().contains("sell_rules"));

        let mut bad_fraction = instrument();
        bad_fraction.sell_rules[0].sell_percent_of_position = dec!(120);
        assert!(bad_fraction.validate().unwrap_err().contains("sell_rules[0]"));

        let mut bad_trigger = instrument();
        bad_trigger.buy_rules[0].trigger_percent_decrease = dec!(-5);
        assert!(bad_trigger.validate().unwrap_err().contains("buy_rules[0]"));

        let mut unknown_market = instrument();
        unknown_market.code = "hk00700".to_string();
        assert!(unknown_market.validate().unwrap_err().contains("market prefix"));
    }
}
