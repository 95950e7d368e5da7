//! One evaluate → report → deliver cycle

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::common::errors::Result;
use crate::common::format::{format_percent, format_price};
use crate::common::traits::{PushChannel, QuoteSource};
use crate::config::types::{AppConfig, InstrumentConfig};
use crate::notify::{DeliveryReport, Dispatcher};
use crate::report::{self, Report};
use crate::strategy::{self, Decision};

/// Everything one run produced
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub decisions: Vec<Decision>,
    pub report: Report,
    /// Absent when delivery was skipped
    pub delivery: Option<DeliveryReport>,
}

impl RunSummary {
    /// True when delivery ran and at least one recipient failed
    pub fn has_delivery_failures(&self) -> bool {
        self.delivery
            .as_ref()
            .map(|d| !d.all_delivered())
            .unwrap_or(false)
    }

    /// Log the per-instrument and per-recipient totals
    pub fn log(&self) {
        info!(
            instruments = self.report.instrument_count,
            actions = self.report.action_count,
            unavailable = self.report.unavailable_count,
            "Evaluation finished"
        );
        match &self.delivery {
            Some(delivery) => info!(
                delivered = delivery.delivered(),
                failed = delivery.failed(),
                "Delivery finished"
            ),
            None => info!("Delivery skipped"),
        }
    }
}

/// Runs the watchlist through the engine and, optionally, the dispatcher
pub struct Watcher<'a, Q: QuoteSource, P: PushChannel> {
    config: &'a AppConfig,
    watchlist: &'a [InstrumentConfig],
    quotes: Q,
    dispatcher: Option<Dispatcher<P>>,
}

impl<'a, Q: QuoteSource, P: PushChannel> Watcher<'a, Q, P> {
    pub fn new(
        config: &'a AppConfig,
        watchlist: &'a [InstrumentConfig],
        quotes: Q,
        dispatcher: Option<Dispatcher<P>>,
    ) -> Self {
        Self {
            config,
            watchlist,
            quotes,
            dispatcher,
        }
    }

    /// Fetch and evaluate every instrument, in watchlist order
    ///
    /// A failed fetch becomes an `Unavailable` decision; only a
    /// configuration fault in the watchlist is returned as an error.
    pub async fn evaluate_all(&self) -> Result<Vec<Decision>> {
        let mut decisions = Vec::with_capacity(self.watchlist.len());

        for instrument in self.watchlist {
            let quote = match self.quotes.fetch_quote(&instrument.code).await {
                Ok(quote) => Some(quote),
                Err(e) => {
                    warn!(
                        "No price for {} ({}) from {}: {}",
                        instrument.name,
                        instrument.code,
                        self.quotes.provider_name(),
                        e
                    );
                    None
                }
            };

            let decision = strategy::evaluate(instrument, quote.as_ref())?;
            info!(
                "{} ({}): {} base {} change {} -> {} | {}",
                decision.instrument_name,
                decision.code,
                format_price(decision.current_price, decision.market()),
                format_price(Some(decision.base_price), decision.market()),
                format_percent(decision.percent_change),
                decision.action_kind.label(),
                decision.detail
            );
            decisions.push(decision);
        }

        Ok(decisions)
    }

    /// Run one full cycle
    #[instrument(skip(self), fields(instruments = self.watchlist.len()))]
    pub async fn run_cycle(&self) -> Result<RunSummary> {
        let decisions = self.evaluate_all().await?;
        let report = report::generate(&decisions);
        info!("Report: {}", report.title);

        let delivery = match self.delivery_plan(&report) {
            Some((dispatcher, recipients)) => {
                Some(dispatcher.deliver(recipients, &report, &decisions).await?)
            }
            None => None,
        };

        Ok(RunSummary {
            decisions,
            report,
            delivery,
        })
    }

    fn delivery_plan(&self, report: &Report) -> Option<(&Dispatcher<P>, &'a [String])> {
        let dispatcher = match &self.dispatcher {
            Some(d) => d,
            None => {
                info!("No dispatcher configured, report not sent");
                return None;
            }
        };
        let recipients = self.config.wechat.recipients.as_slice();
        if recipients.is_empty() {
            warn!("No recipients configured, report not sent");
            return None;
        }
        if self.config.settings.notify_only_on_action && !report.has_actions() {
            info!("No action required, report not sent");
            return None;
        }
        Some((dispatcher, recipients))
    }
}
