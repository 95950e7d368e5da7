//! Decision engine
//!
//! Turns one [`InstrumentConfig`](crate::config::InstrumentConfig) and an
//! optional [`Quote`](crate::common::types::Quote) into exactly one
//! [`Decision`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  quote (or None on fetch failure)                           │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  evaluate()                                                 │
//! │    - tiered buy   : deepest drop tier satisfied             │
//! │    - value buy    : price <= buy_price                      │
//! │    - tiered sell  : highest rise tier satisfied             │
//! │    - hold / unavailable                                     │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  Decision (immutable, consumed by the report)               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! let decision = evaluate(&instrument, Some(&quote))?;
//! if decision.action_required() {
//!     println!("{}: {}", decision.code, decision.detail);
//! }
//! ```

mod engine;
mod scenarios;
mod types;

pub use engine::{evaluate, percent_change, FETCH_FAILED_DETAIL};
pub use scenarios::{evaluate_scenarios, scenarios, Scenario};

pub use types::{ActionKind, Decision, FiredRule, COLOR_BUY, COLOR_NEUTRAL, COLOR_SELL};
