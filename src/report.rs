//! Report generation - one title and body summarising a run

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::common::format::{format_percent, format_price};
use crate::strategy::{ActionKind, Decision};

/// Format of the timestamp embedded in reports and payloads
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Risk reminder closing every report
pub const RISK_WARNING: &str = "⚠️ Investing involves risk, decide with care";

const SEPARATOR_WIDTH: usize = 40;

/// Title and body derived from a list of decisions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub title: String,
    pub body: String,
    pub instrument_count: usize,
    /// Decisions with `action_required`
    pub action_count: usize,
    /// Decisions without a price
    pub unavailable_count: usize,
    pub generated_at: DateTime<Local>,
}

impl Report {
    pub fn has_actions(&self) -> bool {
        self.action_count > 0
    }
}

/// Generate a report stamped with the current local time
pub fn generate(decisions: &[Decision]) -> Report {
    generate_at(decisions, Local::now())
}

/// Generate a report for a fixed timestamp
///
/// Output depends only on the decisions and the timestamp, so two calls
/// with equal inputs produce byte-identical bodies.
pub fn generate_at(decisions: &[Decision], generated_at: DateTime<Local>) -> Report {
    let action_count = decisions.iter().filter(|d| d.action_required()).count();
    let unavailable_count = decisions
        .iter()
        .filter(|d| d.action_kind == ActionKind::Unavailable)
        .count();

    Report {
        title: title(action_count),
        body: render_body(decisions, action_count, &generated_at),
        instrument_count: decisions.len(),
        action_count,
        unavailable_count,
        generated_at,
    }
}

fn title(action_count: usize) -> String {
    if action_count > 0 {
        format!("🚨 Watchlist alert: {} action(s) required", action_count)
    } else {
        "📈 Daily watchlist summary".to_string()
    }
}

fn render_body(decisions: &[Decision], action_count: usize, generated_at: &DateTime<Local>) -> String {
    let separator = "=".repeat(SEPARATOR_WIDTH);
    let mut lines = vec![
        format!("📅 Report time: {}", generated_at.format(TIMESTAMP_FORMAT)),
        format!("📊 Instruments: {}", decisions.len()),
        format!("⚡ Actions: {}", action_count),
        String::new(),
        separator.clone(),
        String::new(),
    ];

    for (i, decision) in decisions.iter().enumerate() {
        let market = decision.market();
        lines.push(format!("[{}] {} ({})", i + 1, decision.instrument_name, decision.code));
        lines.push(format!("💰 Price: {}", format_price(decision.current_price, market)));
        lines.push(format!("📐 Base: {}", format_price(Some(decision.base_price), market)));
        lines.push(format!("📈 Change: {}", format_percent(decision.percent_change)));
        lines.push(format!("🎯 Decision: {}", decision.action_kind.label()));
        lines.push(format!("📝 Detail: {}", decision.detail));
        lines.push(format!("💭 Note: {}", decision.note));
        lines.push(String::new());
    }

    lines.push(separator);
    lines.push("🤖 Generated automatically by stock_watcher".to_string());
    lines.push(RISK_WARNING.to_string());

    lines.join("\n")
}
