//! HTTP quote client for the Sina real-time quote feed

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, REFERER, USER_AGENT};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

use super::parse::parse_quote_line;
use crate::common::errors::{Result, WatcherError};
use crate::common::traits::QuoteSource;
use crate::common::types::Quote;
use crate::config::types::QuoteConfig;

/// Quote client for the Sina `list=` endpoint
#[derive(Debug, Clone)]
pub struct SinaQuoteClient {
    /// HTTP client with the provider headers preset
    client: Client,
    /// URL prefix the symbol is appended to
    base_url: String,
}

impl SinaQuoteClient {
    /// Create a new quote client
    pub fn new(config: &QuoteConfig) -> Result<Self> {
        Self::with_timeout(config, Duration::from_secs(10))
    }

    /// Create a new quote client with custom timeout
    pub fn with_timeout(config: &QuoteConfig, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(REFERER, header_value("referer", &config.referer)?);
        headers.insert(USER_AGENT, header_value("user_agent", &config.user_agent)?);

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| WatcherError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }
}

fn header_value(field: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| WatcherError::Configuration(format!("invalid quote.{}: {}", field, e)))
}

#[async_trait]
impl QuoteSource for SinaQuoteClient {
    #[instrument(skip(self))]
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote> {
        let url = format!("{}{}", self.base_url, symbol);
        debug!("Fetching quote from: {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(WatcherError::quote_unavailable(
                symbol,
                format!("server returned status {}", response.status()),
            ));
        }

        let body = response.text().await?;
        let quote = parse_quote_line(symbol, &body)?;
        debug!("{} ({}) at {}", quote.name, symbol, quote.price);
        Ok(quote)
    }

    fn provider_name(&self) -> &'static str {
        "sina"
    }
}
