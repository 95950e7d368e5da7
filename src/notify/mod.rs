//! Notification dispatch with payload-shape fallback

pub mod dispatcher;
pub mod shapes;

pub use dispatcher::{DeliveryOutcome, DeliveryReport, DeliveryStatus, Dispatcher};
pub use shapes::{MessageContext, PayloadShape};
