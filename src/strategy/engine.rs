//! Tiered rule evaluation against a reference price
//!
//! Evaluation order, first match wins:
//!
//! 1. tiered buy, deepest satisfied drop
//! 2. value buy, price at or below the absolute buy price
//! 3. tiered sell, highest satisfied rise
//! 4. hold
//!
//! Boundaries are inclusive on every path.

use rust_decimal::Decimal;
use tracing::debug;

use super::types::{ActionKind, Decision, FiredRule};
use crate::common::errors::{Result, WatcherError};
use crate::common::format::{format_percent, format_price};
use crate::common::types::Quote;
use crate::config::types::{BuyRule, InstrumentConfig, SellRule};

/// Detail text for an instrument without a price
pub const FETCH_FAILED_DETAIL: &str = "price fetch failed";

/// Evaluate one instrument against an optional quote
///
/// Pure and deterministic. A missing quote is an expected outcome and
/// yields [`ActionKind::Unavailable`]. Errors are configuration faults: a
/// non-positive base price, or one so small that the percent change
/// overflows.
pub fn evaluate(config: &InstrumentConfig, quote: Option<&Quote>) -> Result<Decision> {
    if config.base_price <= Decimal::ZERO {
        return Err(WatcherError::Configuration(format!(
            "{} ({}) has non-positive base price {}",
            config.name, config.code, config.base_price
        )));
    }

    let quote = match quote {
        Some(q) => q,
        None => {
            return Ok(decision(
                config,
                None,
                None,
                ActionKind::Unavailable,
                FETCH_FAILED_DETAIL.to_string(),
                None,
            ))
        }
    };

    let price = quote.price;
    let change = percent_change(price, config.base_price).ok_or_else(|| {
        WatcherError::Configuration(format!(
            "{} ({}): change from base price {} to {} is out of range",
            config.name, config.code, config.base_price, price
        ))
    })?;

    if let Some(rule) = deepest_buy_tier(&config.buy_rules, change) {
        let detail = format!(
            "triggered -{}% rule, buy {}% of capital",
            rule.trigger_percent_decrease.normalize(),
            rule.buy_percent_of_capital.normalize()
        );
        return Ok(decision(
            config,
            Some(price),
            Some(change),
            ActionKind::TieredBuy,
            detail,
            Some(FiredRule::Buy(rule)),
        ));
    }

    if let Some(buy_price) = config.buy_price {
        if price <= buy_price {
            let market = config.market();
            let detail = format!(
                "price {} <= buy price {}",
                format_price(Some(price), market),
                format_price(Some(buy_price), market)
            );
            return Ok(decision(
                config,
                Some(price),
                Some(change),
                ActionKind::ValueBuy,
                detail,
                Some(FiredRule::ValueBuy { buy_price }),
            ));
        }
    }

    if let Some(rule) = highest_sell_tier(&config.sell_rules, change) {
        let detail = format!(
            "triggered +{}% rule, sell {}% of position",
            rule.trigger_percent_increase.normalize(),
            rule.sell_percent_of_position.normalize()
        );
        return Ok(decision(
            config,
            Some(price),
            Some(change),
            ActionKind::TieredSell,
            detail,
            Some(FiredRule::Sell(rule)),
        ));
    }

    let detail = format!("change {}, no rule triggered", format_percent(Some(change)));
    Ok(decision(
        config,
        Some(price),
        Some(change),
        ActionKind::Hold,
        detail,
        None,
    ))
}

/// Signed percent change of `price` relative to `base`
///
/// `None` when `base` is zero or the result does not fit a `Decimal`.
pub fn percent_change(price: Decimal, base: Decimal) -> Option<Decimal> {
    price
        .checked_sub(base)?
        .checked_div(base)?
        .checked_mul(Decimal::ONE_HUNDRED)
}

/// Deepest buy tier whose drop threshold is met
fn deepest_buy_tier(rules: &[BuyRule], change: Decimal) -> Option<BuyRule> {
    let mut sorted = rules.to_vec();
    sorted.sort_by(|a, b| b.trigger_percent_decrease.cmp(&a.trigger_percent_decrease));
    sorted
        .into_iter()
        .find(|rule| change <= -rule.trigger_percent_decrease)
}

/// Highest sell tier whose rise threshold is met
fn highest_sell_tier(rules: &[SellRule], change: Decimal) -> Option<SellRule> {
    let mut sorted = rules.to_vec();
    sorted.sort_by(|a, b| b.trigger_percent_increase.cmp(&a.trigger_percent_increase));
    sorted
        .into_iter()
        .find(|rule| change >= rule.trigger_percent_increase)
}

fn decision(
    config: &InstrumentConfig,
    current_price: Option<Decimal>,
    percent_change: Option<Decimal>,
    action_kind: ActionKind,
    detail: String,
    fired_rule: Option<FiredRule>,
) -> Decision {
    debug!(
        code = %config.code,
        action = %action_kind,
        "{}",
        detail
    );
    Decision {
        instrument_name: config.name.clone(),
        code: config.code.clone(),
        current_price,
        base_price: config.base_price,
        percent_change,
        action_kind,
        detail,
        note: config.note.clone(),
        fired_rule,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn etf() -> InstrumentConfig {
        InstrumentConfig {
            name: "CSI 500 ETF".to_string(),
            code: "sh510500".to_string(),
            base_price: dec!(6.000),
            buy_price: Some(dec!(5.500)),
            buy_rules: Vec::new(),
            sell_rules: vec![
                SellRule::new(dec!(10), dec!(25)),
                SellRule::new(dec!(20), dec!(50)),
            ],
            note: "core holding".to_string(),
        }
    }

    fn with_buy_tiers() -> InstrumentConfig {
        InstrumentConfig {
            buy_rules: vec![
                BuyRule::new(dec!(5), dec!(10)),
                BuyRule::new(dec!(15), dec!(40)),
                BuyRule::new(dec!(10), dec!(20)),
            ],
            ..etf()
        }
    }

    fn at(price: Decimal) -> Quote {
        Quote::new("sh510500", "CSI 500 ETF", price)
    }

    fn eval(config: &InstrumentConfig, price: Decimal) -> Decision {
        evaluate(config, Some(&at(price))).unwrap()
    }

    #[test]
    fn test_sell_at_first_tier_boundary() {
        let d = eval(&etf(), dec!(6.600));
        assert_eq!(d.percent_change, Some(dec!(10)));
        assert_eq!(d.action_kind, ActionKind::TieredSell);
        assert_eq!(d.fired_rule, Some(FiredRule::Sell(SellRule::new(dec!(10), dec!(25)))));
        assert_eq!(d.detail, "triggered +10% rule, sell 25% of position");
        assert!(d.action_required());
    }

    #[test]
    fn test_sell_highest_satisfied_tier_wins() {
        let d = eval(&etf(), dec!(7.200));
        assert_eq!(d.percent_change, Some(dec!(20)));
        assert_eq!(d.fired_rule, Some(FiredRule::Sell(SellRule::new(dec!(20), dec!(50)))));

        let d = eval(&etf(), dec!(7.500));
        assert_eq!(d.percent_change, Some(dec!(25)));
        assert_eq!(d.detail, "triggered +20% rule, sell 50% of position");
    }

    #[test]
    fn test_value_buy_inclusive() {
        let d = eval(&etf(), dec!(5.500));
        assert_eq!(d.action_kind, ActionKind::ValueBuy);
        assert_eq!(d.detail, "price ¥5.500 <= buy price ¥5.500");

        let d = eval(&etf(), dec!(5.400));
        assert_eq!(d.action_kind, ActionKind::ValueBuy);
        assert_eq!(d.fired_rule, Some(FiredRule::ValueBuy { buy_price: dec!(5.500) }));
    }

    #[test]
    fn test_hold_at_base() {
        let d = eval(&etf(), dec!(6.000));
        assert_eq!(d.action_kind, ActionKind::Hold);
        assert_eq!(d.percent_change, Some(Decimal::ZERO));
        assert_eq!(d.detail, "change +0.00%, no rule triggered");
        assert!(!d.action_required());
        assert_eq!(d.fired_rule, None);
    }

    #[test]
    fn test_hold_just_below_sell_tier() {
        let d = eval(&etf(), dec!(6.599));
        assert_eq!(d.action_kind, ActionKind::Hold);
        assert_eq!(d.detail, "change +9.98%, no rule triggered");
    }

    #[test]
    fn test_deepest_buy_tier_wins() {
        // -20% satisfies every tier; the 15% tier is the deepest
        let d = eval(&with_buy_tiers(), dec!(4.800));
        assert_eq!(d.action_kind, ActionKind::TieredBuy);
        assert_eq!(d.fired_rule, Some(FiredRule::Buy(BuyRule::new(dec!(15), dec!(40)))));
        assert_eq!(d.detail, "triggered -15% rule, buy 40% of capital");
    }

    #[test]
    fn test_buy_tier_boundary_inclusive() {
        let d = eval(&with_buy_tiers(), dec!(5.700));
        assert_eq!(d.percent_change, Some(dec!(-5)));
        assert_eq!(d.fired_rule, Some(FiredRule::Buy(BuyRule::new(dec!(5), dec!(10)))));
    }

    #[test]
    fn test_tiered_buy_takes_precedence_over_value_buy() {
        // -10% is below buy_price as well, but a tier matched first
        let d = eval(&with_buy_tiers(), dec!(5.400));
        assert_eq!(d.action_kind, ActionKind::TieredBuy);
        assert_eq!(d.fired_rule, Some(FiredRule::Buy(BuyRule::new(dec!(10), dec!(20)))));
    }

    #[test]
    fn test_no_buy_price_falls_through_to_hold() {
        let config = InstrumentConfig {
            buy_price: None,
            ..etf()
        };
        let d = eval(&config, dec!(5.000));
        assert_eq!(d.action_kind, ActionKind::Hold);
        assert_eq!(d.percent_change.unwrap().round_dp(2), dec!(-16.67));
    }

    #[test]
    fn test_missing_quote_is_unavailable() {
        let d = evaluate(&etf(), None).unwrap();
        assert_eq!(d.action_kind, ActionKind::Unavailable);
        assert_eq!(d.detail, FETCH_FAILED_DETAIL);
        assert_eq!(d.current_price, None);
        assert_eq!(d.percent_change, None);
        assert_eq!(d.base_price, dec!(6.000));
        assert!(!d.action_required());
    }

    #[test]
    fn test_zero_base_price_fails_fast() {
        let config = InstrumentConfig {
            base_price: Decimal::ZERO,
            ..etf()
        };
        let err = evaluate(&config, Some(&at(dec!(1)))).unwrap_err();
        assert!(matches!(err, WatcherError::Configuration(_)));
        assert!(evaluate(&config, None).is_err());
    }

    #[test]
    fn test_tiny_base_price_overflow_is_config_error() {
        let config = InstrumentConfig {
            base_price: dec!(0.0000000000000000000000000001),
            ..etf()
        };
        let err = evaluate(&config, Some(&at(dec!(1000)))).unwrap_err();
        assert!(matches!(err, WatcherError::Configuration(_)));
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_percent_change_checked() {
        assert_eq!(percent_change(dec!(6.6), dec!(6)), Some(dec!(10)));
        assert_eq!(percent_change(dec!(1), Decimal::ZERO), None);
        assert_eq!(percent_change(Decimal::MAX, dec!(-1)), None);
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let config = with_buy_tiers();
        let quote = at(dec!(6.91));
        let first = evaluate(&config, Some(&quote)).unwrap();
        for _ in 0..10 {
            assert_eq!(evaluate(&config, Some(&quote)).unwrap(), first);
        }
    }

    #[test]
    fn test_rule_order_in_config_does_not_matter() {
        let mut reversed = etf();
        reversed.sell_rules.reverse();
        assert_eq!(eval(&reversed, dec!(7.5)), eval(&etf(), dec!(7.5)));
    }

    #[test]
    fn test_us_listing_uses_dollar_sign() {
        let config = InstrumentConfig {
            code: "gb_aapl".to_string(),
            base_price: dec!(200),
            buy_price: Some(dec!(180)),
            ..etf()
        };
        let d = evaluate(&config, Some(&Quote::new("gb_aapl", "Apple", dec!(179.5)))).unwrap();
        assert_eq!(d.detail, "price $179.500 <= buy price $180.000");
    }
}
