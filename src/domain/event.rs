use crate::domain::request::OutboundMessage;
use crate::domain::response::{DeliveryReport, SendResult};

/// Notifications emitted after the client finishes an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmsEvent {
    /// A batch was accepted by the gateway.
    MessagesSent {
        messages: Vec<OutboundMessage>,
        result: SendResult,
    },
    /// A delivery-report webhook body was parsed.
    ReportReceived { reports: Vec<DeliveryReport> },
}
