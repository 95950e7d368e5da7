//! WeChat template message API - token exchange and message send

pub mod auth;
pub mod client;
pub mod messages;

pub use client::WeChatClient;
