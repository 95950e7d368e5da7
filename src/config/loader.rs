//! Configuration loader

use config::{Config, Environment, File};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

use super::types::{AppConfig, InstrumentConfig};
use crate::common::errors::{Result, WatcherError};

/// Highest numbered `WECHAT_USER_OPENID{n}` variable that is read
pub const MAX_NUMBERED_RECIPIENTS: usize = 20;

/// Load configuration from file and environment variables
///
/// Priority (highest to lowest):
/// 1. `WECHAT_APP_ID`, `WECHAT_APP_SECRET`, `WECHAT_TEMPLATE_ID`
/// 2. Environment variables (prefixed with APP_, `__` between nested keys)
/// 3. Configuration file (TOML format)
/// 4. Default values
///
/// Recipients fall back to `WECHAT_USER_OPENID1..20` and then
/// `WECHAT_OPEN_IDS` when none are configured.
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    load_config_from(config_path, std::env::vars().collect())
}

/// [`load_config`] against an explicit set of environment variables
pub fn load_config_from(
    config_path: Option<&str>,
    env: HashMap<String, String>,
) -> Result<AppConfig> {
    let mut builder = Config::builder();

    if let Some(path) = config_path {
        if Path::new(path).exists() {
            debug!("Reading settings file {}", path);
            builder = builder.add_source(File::with_name(path).required(false));
        }
    }

    builder = builder.add_source(
        Environment::with_prefix("APP")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .source(Some(env.clone())),
    );

    let lookup = |key: &str| env.get(key).cloned();
    builder = builder
        .set_override_option("wechat.app_id", lookup("WECHAT_APP_ID"))?
        .set_override_option("wechat.app_secret", lookup("WECHAT_APP_SECRET"))?
        .set_override_option("wechat.template_id", lookup("WECHAT_TEMPLATE_ID"))?;

    let mut config: AppConfig = builder.build()?.try_deserialize()?;

    if config.wechat.recipients.is_empty() {
        config.wechat.recipients = recipients_from_env(lookup);
    }
    config.wechat.recipients = dedup_recipients(std::mem::take(&mut config.wechat.recipients));

    config.validate()?;
    Ok(config)
}

/// Collect recipient ids from the numbered variables, then the comma list
pub fn recipients_from_env<F>(lookup: F) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut recipients: Vec<String> = (1..=MAX_NUMBERED_RECIPIENTS)
        .filter_map(|i| lookup(&format!("WECHAT_USER_OPENID{}", i)))
        .collect();

    if let Some(list) = lookup("WECHAT_OPEN_IDS") {
        recipients.extend(list.split(',').map(|s| s.to_string()));
    }

    recipients
}

fn dedup_recipients(recipients: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(recipients.len());
    for id in recipients {
        let id = id.trim().to_string();
        if !id.is_empty() && !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen
}

/// Read and validate the JSON watchlist
pub fn load_watchlist(path: impl AsRef<Path>) -> Result<Vec<InstrumentConfig>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|e| {
        WatcherError::Configuration(format!("cannot read watchlist {}: {}", path.display(), e))
    })?;
    let instruments = parse_watchlist(&raw)?;
    info!(
        "Loaded {} instruments from {}",
        instruments.len(),
        path.display()
    );
    Ok(instruments)
}

/// Parse and validate a watchlist document (a JSON array of instruments)
pub fn parse_watchlist(raw: &str) -> Result<Vec<InstrumentConfig>> {
    let instruments: Vec<InstrumentConfig> = serde_json::from_str(raw)
        .map_err(|e| WatcherError::Configuration(format!("malformed watchlist: {}", e)))?;

    if instruments.is_empty() {
        return Err(WatcherError::Configuration(
            "watchlist contains no instruments".to_string(),
        ));
    }

    for (i, instrument) in instruments.iter().enumerate() {
        instrument.validate().map_err(|e| {
            WatcherError::Configuration(format!(
                "watchlist entry {} ({}): {}",
                i, instrument.code, e
            ))
        })?;
    }

    Ok(instruments)
}
