use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common::types::Market;
use crate::config::types::{BuyRule, SellRule};

/// Template colour for buy signals
pub const COLOR_BUY: &str = "#FF0000";
/// Template colour for sell signals
pub const COLOR_SELL: &str = "#00AA00";
/// Template colour for neutral information
pub const COLOR_NEUTRAL: &str = "#173177";

/// Outcome category of one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    TieredBuy,
    ValueBuy,
    TieredSell,
    Hold,
    Unavailable,
}

impl ActionKind {
    /// Whether a human should act on this outcome
    pub fn is_actionable(&self) -> bool {
        !matches!(self, ActionKind::Hold | ActionKind::Unavailable)
    }

    /// Human-readable label used in reports and payloads
    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::TieredBuy => "🔴 Tiered buy",
            ActionKind::ValueBuy => "🔴 Value buy",
            ActionKind::TieredSell => "🟢 Tiered sell",
            ActionKind::Hold => "🟡 Hold",
            ActionKind::Unavailable => "⚪ Unavailable",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            ActionKind::TieredBuy | ActionKind::ValueBuy => COLOR_BUY,
            ActionKind::TieredSell => COLOR_SELL,
            ActionKind::Hold | ActionKind::Unavailable => COLOR_NEUTRAL,
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionKind::TieredBuy => write!(f, "tiered_buy"),
            ActionKind::ValueBuy => write!(f, "value_buy"),
            ActionKind::TieredSell => write!(f, "tiered_sell"),
            ActionKind::Hold => write!(f, "hold"),
            ActionKind::Unavailable => write!(f, "unavailable"),
        }
    }
}

/// The rule responsible for an actionable decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FiredRule {
    Buy(BuyRule),
    ValueBuy { buy_price: Decimal },
    Sell(SellRule),
}

/// Result of evaluating one instrument against one price
///
/// Produced once per run per instrument and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub instrument_name: String,
    pub code: String,
    /// Absent when the quote could not be fetched
    pub current_price: Option<Decimal>,
    pub base_price: Decimal,
    /// `(current - base) / base * 100`, absent without a price
    pub percent_change: Option<Decimal>,
    pub action_kind: ActionKind,
    /// Which rule fired, or why none did
    pub detail: String,
    pub note: String,
    pub fired_rule: Option<FiredRule>,
}

impl Decision {
    pub fn action_required(&self) -> bool {
        self.action_kind.is_actionable()
    }

    pub fn market(&self) -> Option<Market> {
        Market::from_symbol(&self.code)
    }
}
