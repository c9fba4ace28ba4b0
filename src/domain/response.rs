/// Classification of a per-message status string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageStatus {
    /// `ok`
    Successful,
    /// `pending`, `queued`, `scheduled`
    Pending,
    /// `error`, `rejected`, `failed`
    Rejected,
    /// Anything else.
    Unknown,
}

impl MessageStatus {
    pub fn classify(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "ok" => Self::Successful,
            "pending" | "queued" | "scheduled" => Self::Pending,
            "error" | "rejected" | "failed" => Self::Rejected,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Batch-level outcome of a send.
pub struct SendResult {
    pub status: String,
    pub error_id: Option<String>,
    pub error_message: Option<String>,
    pub messages: Vec<MessageResult>,
}

impl SendResult {
    /// Status value used when the gateway omits one.
    pub const UNKNOWN_STATUS: &'static str = "unknown";

    pub fn is_successful(&self) -> bool {
        self.status == "ok"
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn successful_message_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_successful()).count()
    }

    pub fn failed_message_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_rejected()).count()
    }

    pub fn pending_message_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_pending()).count()
    }

    /// `false` for an empty result list.
    pub fn all_messages_successful(&self) -> bool {
        !self.messages.is_empty() && self.messages.iter().all(MessageResult::is_successful)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Per-message outcome inside a [`SendResult`].
pub struct MessageResult {
    pub status: String,
    pub sms_id: Option<String>,
    pub custom: Option<String>,
    pub error_id: Option<String>,
    pub error_message: Option<String>,
}

impl MessageResult {
    pub fn kind(&self) -> MessageStatus {
        MessageStatus::classify(&self.status)
    }

    pub fn is_successful(&self) -> bool {
        self.kind() == MessageStatus::Successful
    }

    pub fn is_pending(&self) -> bool {
        self.kind() == MessageStatus::Pending
    }

    pub fn is_rejected(&self) -> bool {
        self.kind() == MessageStatus::Rejected
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One delivery-status callback record.
pub struct DeliveryReport {
    pub status: String,
    pub sms_id: String,
    pub from: String,
    pub to: String,
    pub custom: Option<String>,
    pub sms_date: Option<String>,
    pub dlr_date: Option<String>,
}

impl DeliveryReport {
    pub fn kind(&self) -> MessageStatus {
        MessageStatus::classify(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(status: &str) -> MessageResult {
        MessageResult {
            status: status.to_owned(),
            sms_id: None,
            custom: None,
            error_id: None,
            error_message: None,
        }
    }

    #[test]
    fn status_buckets_are_disjoint() {
        assert_eq!(MessageStatus::classify("ok"), MessageStatus::Successful);
        assert_eq!(MessageStatus::classify("OK"), MessageStatus::Successful);
        for pending in ["pending", "queued", "scheduled"] {
            assert_eq!(MessageStatus::classify(pending), MessageStatus::Pending);
        }
        for rejected in ["error", "rejected", "failed"] {
            assert_eq!(MessageStatus::classify(rejected), MessageStatus::Rejected);
        }
        assert_eq!(MessageStatus::classify("delivered"), MessageStatus::Unknown);

        let unknown = result("mystery");
        assert!(!unknown.is_successful());
        assert!(!unknown.is_pending());
        assert!(!unknown.is_rejected());
    }

    #[test]
    fn derived_counts() {
        let send = SendResult {
            status: "ok".to_owned(),
            error_id: None,
            error_message: None,
            messages: vec![result("ok"), result("error"), result("queued"), result("?")],
        };
        assert!(send.is_successful());
        assert_eq!(send.message_count(), 4);
        assert_eq!(send.successful_message_count(), 1);
        assert_eq!(send.failed_message_count(), 1);
        assert_eq!(send.pending_message_count(), 1);
        assert!(!send.all_messages_successful());
    }

    #[test]
    fn all_successful_requires_at_least_one_message() {
        let mut send = SendResult {
            status: "ok".to_owned(),
            error_id: None,
            error_message: None,
            messages: Vec::new(),
        };
        assert!(!send.all_messages_successful());
        send.messages.push(result("ok"));
        assert!(send.all_messages_successful());
    }
}
