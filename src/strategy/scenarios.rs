//! Hypothetical prices for dry-checking a watchlist entry

use rust_decimal::Decimal;

use super::engine::evaluate;
use super::types::Decision;
use crate::common::errors::Result;
use crate::common::types::Quote;
use crate::config::types::InstrumentConfig;

/// A named hypothetical price
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub label: String,
    pub price: Decimal,
}

/// Prices sitting exactly on each configured boundary, plus the base price
///
/// Ordered from cheapest to dearest; boundaries that would overflow are
/// left out.
pub fn scenarios(config: &InstrumentConfig) -> Vec<Scenario> {
    let base = config.base_price;
    let mut out = vec![Scenario {
        label: "at base price".to_string(),
        price: base,
    }];

    if let Some(buy_price) = config.buy_price {
        out.push(Scenario {
            label: "at buy price".to_string(),
            price: buy_price,
        });
    }
    for rule in &config.buy_rules {
        if let Some(price) = shifted(base, -rule.trigger_percent_decrease) {
            out.push(Scenario {
                label: format!("-{}% from base", rule.trigger_percent_decrease.normalize()),
                price,
            });
        }
    }
    for rule in &config.sell_rules {
        if let Some(price) = shifted(base, rule.trigger_percent_increase) {
            out.push(Scenario {
                label: format!("+{}% from base", rule.trigger_percent_increase.normalize()),
                price,
            });
        }
    }

    out.sort_by(|a, b| a.price.cmp(&b.price));
    out
}

/// Evaluate the instrument at every scenario price
pub fn evaluate_scenarios(config: &InstrumentConfig) -> Result<Vec<(Scenario, Decision)>> {
    scenarios(config)
        .into_iter()
        .map(|scenario| {
            let quote = Quote::new(config.code.as_str(), config.name.as_str(), scenario.price);
            let decision = evaluate(config, Some(&quote))?;
            Ok((scenario, decision))
        })
        .collect()
}

fn shifted(base: Decimal, percent: Decimal) -> Option<Decimal> {
    let factor = Decimal::ONE.checked_add(percent.checked_div(Decimal::ONE_HUNDRED)?)?;
    base.checked_mul(factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{BuyRule, SellRule};
    use crate::strategy::ActionKind;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn etf() -> InstrumentConfig {
        InstrumentConfig {
            name: "CSI 500 ETF".to_string(),
            code: "sh510500".to_string(),
            base_price: dec!(6.000),
            buy_price: Some(dec!(5.500)),
            buy_rules: vec![BuyRule::new(dec!(10), dec!(20))],
            sell_rules: vec![
                SellRule::new(dec!(20), dec!(50)),
                SellRule::new(dec!(10), dec!(25)),
            ],
            note: String::new(),
        }
    }

    #[test]
    fn test_scenarios_sit_on_boundaries() {
        let prices: Vec<Decimal> = scenarios(&etf()).iter().map(|s| s.price).collect();
        assert_eq!(
            prices,
            vec![dec!(5.4), dec!(5.5), dec!(6), dec!(6.6), dec!(7.2)]
        );
    }

    #[test]
    fn test_scenario_decisions() {
        let kinds: Vec<(String, ActionKind)> = evaluate_scenarios(&etf())
            .unwrap()
            .into_iter()
            .map(|(s, d)| (s.label, d.action_kind))
            .collect();

        assert_eq!(
            kinds,
            vec![
                ("-10% from base".to_string(), ActionKind::TieredBuy),
                ("at buy price".to_string(), ActionKind::ValueBuy),
                ("at base price".to_string(), ActionKind::Hold),
                ("+10% from base".to_string(), ActionKind::TieredSell),
                ("+20% from base".to_string(), ActionKind::TieredSell),
            ]
        );
    }
}
