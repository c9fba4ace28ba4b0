use crate::config::{LogLevel, LoggingSettings};
use crate::domain::SendResult;

use super::SmsUpError;

macro_rules! event_at {
    ($level:expr, $($arg:tt)+) => {
        match $level {
            LogLevel::Trace => tracing::trace!($($arg)+),
            LogLevel::Debug => tracing::debug!($($arg)+),
            LogLevel::Info => tracing::info!($($arg)+),
            LogLevel::Warn => tracing::warn!($($arg)+),
            LogLevel::Error => tracing::error!($($arg)+),
        }
    };
}

pub(super) fn sent(settings: &LoggingSettings, message_count: usize, result: &SendResult) {
    if !settings.enabled {
        return;
    }
    event_at!(
        settings.level,
        channel = %settings.channel,
        message_count,
        status = %result.status,
        successful = result.successful_message_count(),
        failed = result.failed_message_count(),
        "smsup: messages sent"
    );
}

pub(super) fn failed(settings: &LoggingSettings, operation: &'static str, error: &SmsUpError) {
    if !settings.enabled {
        return;
    }
    match error {
        SmsUpError::Service { status, error_id, .. } => tracing::error!(
            channel = %settings.channel,
            operation,
            http_status = status,
            error_id = error_id.as_deref().unwrap_or_default(),
            error = %error,
            "smsup: gateway rejected request"
        ),
        _ => tracing::error!(
            channel = %settings.channel,
            operation,
            error = %error,
            "smsup: request failed"
        ),
    }
}

pub(super) fn publish_failed(
    settings: &LoggingSettings,
    event: &'static str,
    error: &(dyn std::error::Error + Send + Sync),
) {
    if !settings.enabled {
        return;
    }
    tracing::warn!(
        channel = %settings.channel,
        event,
        error = %error,
        "smsup: event publisher failed"
    );
}
