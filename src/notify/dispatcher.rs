//! Delivery of a report to every recipient with shape fallback

use serde::Serialize;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

use super::shapes::{MessageContext, PayloadShape, FALLBACK_CHAIN};
use crate::common::errors::{Result, WatcherError};
use crate::common::traits::PushChannel;
use crate::report::Report;
use crate::strategy::Decision;
use crate::wechat::messages::TemplateMessage;

/// Final state of one recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DeliveryStatus {
    Delivered { shape: PayloadShape },
    Failed { reason: String },
}

/// What happened for one recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryOutcome {
    pub recipient: String,
    pub status: DeliveryStatus,
    /// Send requests made for this recipient
    pub attempts: usize,
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self.status, DeliveryStatus::Delivered { .. })
    }
}

/// Outcomes of one delivery run, in recipient order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    pub outcomes: Vec<DeliveryOutcome>,
}

impl DeliveryReport {
    pub fn delivered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_delivered()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.delivered()
    }

    pub fn all_delivered(&self) -> bool {
        self.failed() == 0
    }
}

/// Sends reports through a [`PushChannel`]
pub struct Dispatcher<P: PushChannel> {
    channel: P,
    template_id: String,
    send_delay: Duration,
    shapes: Vec<PayloadShape>,
}

impl<P: PushChannel> Dispatcher<P> {
    /// Create a dispatcher using the full fallback chain
    pub fn new(channel: P, template_id: impl Into<String>, send_delay: Duration) -> Self {
        Self {
            channel,
            template_id: template_id.into(),
            send_delay,
            shapes: FALLBACK_CHAIN.to_vec(),
        }
    }

    /// Replace the fallback chain
    pub fn with_shapes(mut self, shapes: Vec<PayloadShape>) -> Self {
        self.shapes = shapes;
        self
    }

    pub fn channel(&self) -> &P {
        &self.channel
    }

    /// Deliver the report to every recipient, in order
    ///
    /// The access token is fetched once up front; if that fails nothing
    /// is sent and the error is returned. Per-recipient failures are
    /// recorded in the returned report and never stop later recipients.
    #[instrument(skip_all, fields(recipients = recipients.len()))]
    pub async fn deliver(
        &self,
        recipients: &[String],
        report: &Report,
        decisions: &[Decision],
    ) -> Result<DeliveryReport> {
        let access_token = self.channel.fetch_access_token().await.map_err(|e| match e {
            WatcherError::Authentication(_) => e,
            other => WatcherError::Authentication(other.to_string()),
        })?;
        info!("Access token obtained, delivering to {} recipients", recipients.len());

        let ctx = MessageContext::new(report, decisions);
        let mut outcomes = Vec::with_capacity(recipients.len());

        for (i, recipient) in recipients.iter().enumerate() {
            if i > 0 && !self.send_delay.is_zero() {
                tokio::time::sleep(self.send_delay).await;
            }

            let outcome = self.deliver_one(&access_token, recipient, &ctx).await;
            match &outcome.status {
                DeliveryStatus::Delivered { shape } => info!(
                    "Delivered to {} with {} payload after {} attempt(s)",
                    recipient, shape, outcome.attempts
                ),
                DeliveryStatus::Failed { reason } => error!(
                    "Delivery to {} failed after {} attempt(s): {}",
                    recipient, outcome.attempts, reason
                ),
            }
            outcomes.push(outcome);
        }

        Ok(DeliveryReport { outcomes })
    }

    async fn deliver_one(
        &self,
        access_token: &str,
        recipient: &str,
        ctx: &MessageContext<'_>,
    ) -> DeliveryOutcome {
        let mut attempts = 0;

        for shape in &self.shapes {
            let data = match shape.build(ctx) {
                Some(data) => data,
                None => continue,
            };
            let message = TemplateMessage {
                touser: recipient.to_string(),
                template_id: self.template_id.clone(),
                data,
                shape: Some(*shape),
            };

            attempts += 1;
            let status = match self.channel.send_template(access_token, &message).await {
                Ok(response) if response.is_success() => DeliveryStatus::Delivered { shape: *shape },
                Ok(response) if response.is_field_mismatch() => {
                    warn!(
                        "{} payload rejected for {} (field mismatch), trying next shape",
                        shape, recipient
                    );
                    continue;
                }
                Ok(response) => DeliveryStatus::Failed {
                    reason: match response.errcode {
                        Some(code) => format!("rejected with errcode {}: {}", code, response.errmsg),
                        None => "response carried no errcode".to_string(),
                    },
                },
                Err(e) => DeliveryStatus::Failed {
                    reason: WatcherError::Delivery(e.to_string()).to_string(),
                },
            };

            return DeliveryOutcome {
                recipient: recipient.to_string(),
                status,
                attempts,
            };
        }

        DeliveryOutcome {
            recipient: recipient.to_string(),
            status: DeliveryStatus::Failed {
                reason: "no payload shape accepted".to_string(),
            },
            attempts,
        }
    }
}
