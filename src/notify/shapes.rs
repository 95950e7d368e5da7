//! Template payload shapes, from richest to simplest
//!
//! The field names a template expects cannot be queried, so the
//! dispatcher walks [`FALLBACK_CHAIN`] until the endpoint stops reporting
//! a field mismatch.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::common::format::{format_percent, format_price, take_chars, truncate_chars};
use crate::report::{Report, RISK_WARNING, TIMESTAMP_FORMAT};
use crate::strategy::{Decision, COLOR_BUY, COLOR_NEUTRAL, COLOR_SELL};
use crate::wechat::messages::TemplateField;

const COLOR_TEXT: &str = "#666666";
const COLOR_MUTED: &str = "#999999";

const SUMMARY_BODY_CHARS: usize = 600;
const STANDARD_BODY_CHARS: usize = 500;
const CONTENT_BODY_CHARS: usize = 800;

/// Field map of a template payload
pub type FieldMap = BTreeMap<String, TemplateField>;

/// One named-field structure a template may accept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PayloadShape {
    /// Twelve fields: run summary plus a breakdown of the lead decision
    Detailed,
    /// Six fields: run summary plus the truncated body
    Summary,
    /// The classic `first` / `keyword1` / `keyword2` / `remark` layout
    Standard,
    /// A single free-text `content` field
    Content,
}

/// Shapes in the order they are attempted
pub const FALLBACK_CHAIN: [PayloadShape; 4] = [
    PayloadShape::Detailed,
    PayloadShape::Summary,
    PayloadShape::Standard,
    PayloadShape::Content,
];

/// Everything a payload may draw from
#[derive(Debug, Clone, Copy)]
pub struct MessageContext<'a> {
    pub report: &'a Report,
    pub decisions: &'a [Decision],
}

impl<'a> MessageContext<'a> {
    pub fn new(report: &'a Report, decisions: &'a [Decision]) -> Self {
        Self { report, decisions }
    }

    /// The decision a single-instrument shape describes: the first one
    /// requiring action, else the first one
    pub fn lead_decision(&self) -> Option<&'a Decision> {
        self.decisions
            .iter()
            .find(|d| d.action_required())
            .or_else(|| self.decisions.first())
    }

    fn title_color(&self) -> &'static str {
        if self.report.has_actions() {
            COLOR_BUY
        } else {
            COLOR_NEUTRAL
        }
    }

    fn report_time(&self) -> String {
        self.report.generated_at.format(TIMESTAMP_FORMAT).to_string()
    }
}

impl PayloadShape {
    pub fn name(&self) -> &'static str {
        match self {
            PayloadShape::Detailed => "detailed",
            PayloadShape::Summary => "summary",
            PayloadShape::Standard => "standard",
            PayloadShape::Content => "content",
        }
    }

    /// Build this shape's field map
    ///
    /// Returns `None` when the shape cannot be filled, which only happens
    /// for [`PayloadShape::Detailed`] without any decision.
    pub fn build(&self, ctx: &MessageContext<'_>) -> Option<FieldMap> {
        let report = ctx.report;
        let mut fields = FieldMap::new();
        let mut put = |name: &str, value: String, color: &str| {
            fields.insert(name.to_string(), TemplateField::new(value, color));
        };

        match self {
            PayloadShape::Detailed => {
                let lead = ctx.lead_decision()?;
                let market = lead.market();
                put("title", report.title.clone(), ctx.title_color());
                put("report_time", ctx.report_time(), COLOR_NEUTRAL);
                put("stock_count", report.instrument_count.to_string(), COLOR_NEUTRAL);
                put("action_count", report.action_count.to_string(), ctx.title_color());
                put("stock_name", lead.instrument_name.clone(), COLOR_NEUTRAL);
                put("current_price", format_price(lead.current_price, market), COLOR_NEUTRAL);
                put("base_price", format_price(Some(lead.base_price), market), COLOR_NEUTRAL);
                put("price_change", format_percent(lead.percent_change), change_color(lead.percent_change));
                put("decision", lead.action_kind.label().to_string(), lead.action_kind.color());
                put("suggestion", lead.detail.clone(), COLOR_TEXT);
                put("note", lead.note.clone(), COLOR_MUTED);
                put("warning", RISK_WARNING.to_string(), COLOR_MUTED);
            }
            PayloadShape::Summary => {
                put("title", report.title.clone(), ctx.title_color());
                put("report_time", ctx.report_time(), COLOR_NEUTRAL);
                put("stock_count", report.instrument_count.to_string(), COLOR_NEUTRAL);
                put("action_count", report.action_count.to_string(), ctx.title_color());
                put("content", truncate_chars(&report.body, SUMMARY_BODY_CHARS), COLOR_TEXT);
                put("tip", RISK_WARNING.to_string(), COLOR_MUTED);
            }
            PayloadShape::Standard => {
                put("first", report.title.clone(), ctx.title_color());
                put("keyword1", ctx.report_time(), COLOR_NEUTRAL);
                put("keyword2", truncate_chars(&report.body, STANDARD_BODY_CHARS), COLOR_TEXT);
                put("remark", RISK_WARNING.to_string(), COLOR_MUTED);
            }
            PayloadShape::Content => {
                let text = format!(
                    "{}\n\n{}",
                    report.title,
                    take_chars(&report.body, CONTENT_BODY_CHARS)
                );
                put("content", text, COLOR_NEUTRAL);
            }
        }

        Some(fields)
    }
}

impl std::fmt::Display for PayloadShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Rises red, falls green
fn change_color(change: Option<Decimal>) -> &'static str {
    match change {
        Some(c) if c > Decimal::ZERO => COLOR_BUY,
        Some(c) if c < Decimal::ZERO => COLOR_SELL,
        _ => COLOR_NEUTRAL,
    }
}
