//! Error types for the application

use thiserror::Error;

/// Result type alias using our WatcherError
pub type Result<T> = std::result::Result<T, WatcherError>;

/// Main error type for the watcher
#[derive(Error, Debug)]
pub enum WatcherError {
    /// Malformed or incomplete watchlist, settings or credentials
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Quote could not be fetched or parsed for one instrument
    #[error("Quote unavailable for {symbol}: {reason}")]
    QuoteUnavailable { symbol: String, reason: String },

    /// Access token could not be obtained
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// A recipient could not be reached
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// HTTP request errors
    #[error("HTTP request error: {0}")]
    HttpRequest(reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// File system errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid API response
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Timeout errors
    #[error("Operation timed out: {0}")]
    Timeout(String),
}

impl WatcherError {
    /// Faults that end the whole run. Everything else is recorded against
    /// the affected instrument or recipient and the run continues.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            WatcherError::Configuration(_) | WatcherError::Authentication(_)
        )
    }

    pub(crate) fn quote_unavailable(symbol: &str, reason: impl Into<String>) -> Self {
        WatcherError::QuoteUnavailable {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<reqwest::Error> for WatcherError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            WatcherError::Timeout(err.to_string())
        } else {
            WatcherError::HttpRequest(err)
        }
    }
}

impl From<config::ConfigError> for WatcherError {
    fn from(err: config::ConfigError) -> Self {
        WatcherError::Configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_configuration_and_auth_are_fatal() {
        assert!(WatcherError::Configuration("x".into()).is_fatal());
        assert!(WatcherError::Authentication("x".into()).is_fatal());
        assert!(!WatcherError::quote_unavailable("sh510500", "empty").is_fatal());
        assert!(!WatcherError::Delivery("x".into()).is_fatal());
        assert!(!WatcherError::Timeout("x".into()).is_fatal());
    }

    #[test]
    fn test_quote_unavailable_message() {
        let err = WatcherError::quote_unavailable("gb_aapl", "too few fields");
        assert_eq!(
            err.to_string(),
            "Quote unavailable for gb_aapl: too few fields"
        );
    }
}
