//! Trait definitions for the external collaborators

use async_trait::async_trait;

use super::errors::Result;
use super::types::Quote;
use crate::wechat::messages::{SendResponse, TemplateMessage};

/// Trait for real-time price providers
///
/// Implementations perform one request per call and never retry. Any
/// transport, HTTP or parse failure comes back as an error, which the
/// pipeline turns into an `Unavailable` decision for that instrument.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetch the current price for an exchange-qualified symbol
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote>;

    /// Get the name of the provider
    fn provider_name(&self) -> &'static str;
}

/// Trait for templated push-notification endpoints
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PushChannel: Send + Sync {
    /// Exchange the long-lived application credentials for a bearer token
    async fn fetch_access_token(&self) -> Result<String>;

    /// Post one template message
    ///
    /// A structured rejection from the endpoint is returned as `Ok` with a
    /// non-zero `errcode`; only transport failures are errors.
    async fn send_template(
        &self,
        access_token: &str,
        message: &TemplateMessage,
    ) -> Result<SendResponse>;
}
