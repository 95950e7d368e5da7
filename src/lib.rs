//! StockWatcher Library
//!
//! Samples real-time prices for a watchlist, evaluates tiered buy/sell
//! rules against a reference price and pushes a templated report.

pub mod common;
pub mod config;
pub mod notify;
pub mod pipeline;
pub mod quote;
pub mod report;
pub mod strategy;
pub mod wechat;

// Re-export commonly used types
pub use common::errors::{Result, WatcherError};
pub use common::traits::{PushChannel, QuoteSource};
pub use common::types::{Market, Quote};
pub use config::types::{AppConfig, BuyRule, Credentials, InstrumentConfig, SellRule};
pub use notify::{DeliveryOutcome, DeliveryReport, DeliveryStatus, Dispatcher, PayloadShape};
pub use pipeline::{RunSummary, Watcher};
pub use quote::SinaQuoteClient;
pub use report::{generate, generate_at, Report};
pub use strategy::{evaluate, ActionKind, Decision, FiredRule};
pub use wechat::WeChatClient;
