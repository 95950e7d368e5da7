//! HTTP client for the templated push API

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

use super::auth;
use super::messages::{SendResponse, TemplateMessage};
use crate::common::errors::{Result, WatcherError};
use crate::common::traits::PushChannel;
use crate::config::types::Credentials;

/// Path of the template send endpoint, relative to the API base URL
pub const SEND_PATH: &str = "/cgi-bin/message/template/send";

/// Push client bound to one application
#[derive(Debug, Clone)]
pub struct WeChatClient {
    /// HTTP client
    client: Client,
    /// Base URL of the push API
    api_url: String,
    /// Application credentials used for the token exchange
    credentials: Credentials,
}

impl WeChatClient {
    /// Create a new push client
    pub fn new(api_url: &str, credentials: Credentials) -> Result<Self> {
        Self::with_timeout(api_url, credentials, Duration::from_secs(10))
    }

    /// Create a new push client with custom timeout
    pub fn with_timeout(api_url: &str, credentials: Credentials, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WatcherError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// Template id messages are bound to
    pub fn template_id(&self) -> &str {
        &self.credentials.template_id
    }
}

#[async_trait]
impl PushChannel for WeChatClient {
    async fn fetch_access_token(&self) -> Result<String> {
        auth::fetch_access_token(&self.client, &self.api_url, &self.credentials).await
    }

    #[instrument(skip(self, access_token, message), fields(touser = %message.touser))]
    async fn send_template(
        &self,
        access_token: &str,
        message: &TemplateMessage,
    ) -> Result<SendResponse> {
        let url = format!("{}{}", self.api_url, SEND_PATH);
        debug!("Posting template message with {} fields", message.data.len());

        let response = self
            .client
            .post(&url)
            .query(&[("access_token", access_token)])
            .json(message)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(WatcherError::InvalidResponse(format!(
                "Server returned status {}: {}",
                status, body
            )));
        }

        let result: SendResponse = response.json().await?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials::new("wx123".into(), "secret".into(), "tmpl".into())
    }

    #[test]
    fn test_client_creation() {
        let client = WeChatClient::new("https://api.weixin.qq.com", credentials());
        assert!(client.is_ok());
    }

    #[test]
    fn test_url_normalization() {
        let client = WeChatClient::new("https://api.weixin.qq.com/", credentials()).unwrap();
        assert!(!client.api_url.ends_with('/'));
        assert_eq!(client.template_id(), "tmpl");
    }
}
