//! Access token exchange for the push API

use reqwest::Client;
use tracing::{debug, instrument};

use super::messages::TokenResponse;
use crate::common::errors::{Result, WatcherError};
use crate::config::types::Credentials;

/// Path of the token endpoint, relative to the API base URL
pub const TOKEN_PATH: &str = "/cgi-bin/token";

/// Exchange the application id and secret for a short-lived bearer token
///
/// Every failure, transport included, is reported as
/// [`WatcherError::Authentication`] because no recipient can be reached
/// without a token.
#[instrument(skip(client, credentials), fields(app_id = %credentials.app_id))]
pub async fn fetch_access_token(
    client: &Client,
    api_url: &str,
    credentials: &Credentials,
) -> Result<String> {
    let url = format!("{}{}", api_url, TOKEN_PATH);
    debug!("Requesting access token from: {}", url);

    let response = client
        .get(&url)
        .query(&[
            ("grant_type", "client_credential"),
            ("appid", credentials.app_id.as_str()),
            ("secret", credentials.app_secret.as_str()),
        ])
        .send()
        .await
        .map_err(|e| WatcherError::Authentication(format!("token request failed: {}", e)))?;

    if !response.status().is_success() {
        return Err(WatcherError::Authentication(format!(
            "token endpoint returned status {}",
            response.status()
        )));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| WatcherError::Authentication(format!("malformed token response: {}", e)))?;

    extract_token(token)
}

/// Pull the token out of a parsed response
pub fn extract_token(response: TokenResponse) -> Result<String> {
    match response.access_token {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(WatcherError::Authentication(format!(
            "no access_token in response (errcode {}, {})",
            response.errcode.unwrap_or_default(),
            response.errmsg.unwrap_or_default()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> TokenResponse {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_extract_token() {
        let token = extract_token(parse(r#"{"access_token":"ACCESS","expires_in":7200}"#));
        assert_eq!(token.unwrap(), "ACCESS");
    }

    #[test]
    fn test_missing_token_is_auth_fault() {
        let err = extract_token(parse(r#"{"errcode":40125,"errmsg":"invalid appsecret"}"#))
            .unwrap_err();
        assert!(matches!(err, WatcherError::Authentication(_)));
        assert!(err.to_string().contains("40125"));
    }

    #[test]
    fn test_empty_token_is_auth_fault() {
        assert!(extract_token(parse(r#"{"access_token":""}"#)).is_err());
    }
}
