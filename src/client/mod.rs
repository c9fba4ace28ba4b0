//! Client layer: orchestrates validation, transport calls and response mapping.

mod logging;

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;
use url::Url;

use crate::config::{RetryPolicy, SmsUpConfig};
use crate::domain::{
    ApiKey, DeliveryReport, Message, MessageBuilder, MessageSpec, MessageValidator, Recipient,
    SendAt, SendOptions, SendResult, SmsEvent, ValidationError,
};
use crate::transport::{self, Decoded, Endpoint, Envelope, TransportError};

/// Fallback message when the gateway rejects a request without `error_msg`.
pub const UNKNOWN_ERROR: &str = "unknown error";

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Raw HTTP exchange result handed back by an [`HttpTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// "POST JSON, get a body back" capability used by [`SmsUpClient`].
///
/// Implementations own retries, pooling, TLS and timeouts. Errors are surfaced
/// to callers as [`SmsUpError::Transport`].
pub trait HttpTransport: Send + Sync {
    fn post_json<'a>(
        &'a self,
        url: &'a str,
        body: Value,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl HttpTransport for ReqwestTransport {
    fn post_json<'a>(
        &'a self,
        url: &'a str,
        body: Value,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            let response = self
                .client
                .post(url)
                .header(reqwest::header::ACCEPT, "application/json")
                .json(&body)
                .send()
                .await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }
}

/// Receives [`SmsEvent`]s after successful operations.
///
/// Publishing is fire-and-forget: an error is logged and never undoes the
/// operation that produced the event.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: &SmsEvent) -> Result<(), Box<dyn StdError + Send + Sync>>;
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`SmsUpClient`].
pub enum SmsUpError {
    /// No API key is configured; nothing was sent.
    #[error("the SmsUp API key is missing")]
    MissingApiKey,

    /// A message or batch failed validation; nothing was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The client could not be set up from its configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The request payload could not be encoded.
    #[error("failed to encode request: {0}")]
    Encode(#[source] Box<dyn StdError + Send + Sync>),

    /// HTTP client / transport failure (DNS, TLS, timeouts, etc).
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// Response body was not the JSON shape the gateway documents.
    #[error("invalid response (HTTP {status}): {source}")]
    InvalidResponse {
        status: u16,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// The gateway answered with a status other than `ok`.
    #[error("service error (HTTP {status}): {message}")]
    Service {
        error_id: Option<String>,
        message: String,
        status: u16,
        body: Value,
    },
}

impl SmsUpError {
    /// Per-item validation messages, if this is an aggregated validation failure.
    pub fn validation_errors(&self) -> &[String] {
        match self {
            Self::Validation(err) => err.errors(),
            _ => &[],
        }
    }

    fn invalid_response(status: u16, err: TransportError) -> Self {
        Self::InvalidResponse {
            status,
            source: Box::new(err),
        }
    }
}

#[derive(Clone)]
/// Builder for [`SmsUpClient`].
///
/// Use this to inject a custom [`HttpTransport`], an [`EventPublisher`], or the
/// URL of a delivery-report route served by your application.
pub struct SmsUpClientBuilder {
    config: SmsUpConfig,
    transport: Option<Arc<dyn HttpTransport>>,
    publisher: Option<Arc<dyn EventPublisher>>,
    report_route: Option<String>,
    user_agent: Option<String>,
}

impl SmsUpClientBuilder {
    pub fn new(config: SmsUpConfig) -> Self {
        Self {
            config,
            transport: None,
            publisher: None,
            report_route: None,
            user_agent: None,
        }
    }

    /// Use a custom transport instead of the built-in reqwest client.
    ///
    /// Timeouts from the configuration are not applied to custom transports.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// URL of the application's delivery-report webhook. Used as `report_url`
    /// when neither the call nor the configuration provides one.
    pub fn report_route(mut self, url: impl Into<String>) -> Self {
        self.report_route = Some(url.into());
        self
    }

    /// Override the HTTP `User-Agent` header of the built-in transport.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn build(self) -> Result<SmsUpClient, SmsUpError> {
        let base_url = parse_base_url(&self.config.api_url)?;

        let http = match self.transport {
            Some(transport) => transport,
            None => {
                let mut builder = reqwest::Client::builder()
                    .timeout(self.config.http.timeout())
                    .connect_timeout(self.config.http.connect_timeout());
                if let Some(user_agent) = self.user_agent {
                    builder = builder.user_agent(user_agent);
                }
                let client = builder
                    .build()
                    .map_err(|err| SmsUpError::Transport(Box::new(err)))?;
                Arc::new(ReqwestTransport { client })
            }
        };

        Ok(SmsUpClient {
            api_key: self.config.api_key.clone().and_then(ApiKey::new),
            validator: MessageValidator::new(self.config.validation_context()),
            base_url,
            config: Arc::new(self.config),
            http,
            publisher: self.publisher,
            report_route: self.report_route,
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url, SmsUpError> {
    let mut raw = raw.trim().to_owned();
    if !raw.ends_with('/') {
        raw.push('/');
    }
    let url = Url::parse(&raw)
        .map_err(|err| SmsUpError::Configuration(format!("invalid api_url '{raw}': {err}")))?;
    if url.cannot_be_a_base() {
        return Err(SmsUpError::Configuration(format!(
            "invalid api_url '{raw}': cannot be a base URL"
        )));
    }
    Ok(url)
}

#[derive(Clone)]
/// High-level SmsUp client.
///
/// Each send runs validation, composition, one HTTP round trip and response
/// parsing, in that order, and stops at the first failure. A rejected batch
/// never reaches the network. The client holds only immutable state and can
/// be shared across tasks.
pub struct SmsUpClient {
    config: Arc<SmsUpConfig>,
    api_key: Option<ApiKey>,
    base_url: Url,
    validator: MessageValidator,
    http: Arc<dyn HttpTransport>,
    publisher: Option<Arc<dyn EventPublisher>>,
    report_route: Option<String>,
}

impl SmsUpClient {
    /// Create a client with the built-in HTTP transport.
    pub fn new(config: SmsUpConfig) -> Result<Self, SmsUpError> {
        SmsUpClientBuilder::new(config).build()
    }

    pub fn builder(config: SmsUpConfig) -> SmsUpClientBuilder {
        SmsUpClientBuilder::new(config)
    }

    pub fn config(&self) -> &SmsUpConfig {
        &self.config
    }

    /// Retry preferences from the configuration. The client itself never retries.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.config.retry
    }

    /// Validate and send a batch as one request.
    ///
    /// Errors:
    /// - [`SmsUpError::MissingApiKey`] / [`SmsUpError::Validation`] before any network call,
    /// - [`SmsUpError::Transport`] when the HTTP exchange fails,
    /// - [`SmsUpError::InvalidResponse`] for a body that is not a JSON object,
    /// - [`SmsUpError::Service`] when the gateway status is not `ok`.
    pub async fn send_messages(
        &self,
        messages: &[MessageSpec],
        options: &SendOptions,
    ) -> Result<SendResult, SmsUpError> {
        let result = self.dispatch_messages(messages, options).await;
        if let Err(err) = &result {
            logging::failed(&self.config.logging, "send", err);
        }
        result
    }

    /// Send a single built message.
    pub async fn send_message(
        &self,
        message: &Message,
        options: &SendOptions,
    ) -> Result<SendResult, SmsUpError> {
        self.send_messages(&[message.to_spec()], options).await
    }

    /// Send a notification draft, routing it to `fallback_recipient` when the
    /// draft has no recipient of its own.
    pub async fn send_notification(
        &self,
        draft: MessageBuilder,
        fallback_recipient: Option<&str>,
        options: &SendOptions,
    ) -> Result<SendResult, SmsUpError> {
        let draft = if draft.has_recipient() {
            draft
        } else {
            let to = fallback_recipient
                .filter(|to| !to.is_empty())
                .ok_or(ValidationError::MissingRecipient)?;
            draft.to(to)?
        };
        let message = draft.build()?;
        self.send_message(&message, options).await
    }

    /// Ask the gateway whether `phone` is a live number (HLR lookup).
    pub async fn verify_phone(&self, phone: &str) -> Result<bool, SmsUpError> {
        let result = self.lookup_phone(phone).await;
        if let Err(err) = &result {
            logging::failed(&self.config.logging, "verify_phone", err);
        }
        result
    }

    /// Current account balance, as the gateway formats it.
    pub async fn get_balance(&self) -> Result<String, SmsUpError> {
        let result = self.fetch_balance().await;
        if let Err(err) = &result {
            logging::failed(&self.config.logging, "get_balance", err);
        }
        result
    }

    /// Parse a delivery-report webhook body and publish
    /// [`SmsEvent::ReportReceived`].
    pub fn receive_delivery_report(&self, body: &str) -> Result<Vec<DeliveryReport>, SmsUpError> {
        let reports = parse_delivery_reports(body)?;
        self.publish(
            "report_received",
            SmsEvent::ReportReceived {
                reports: reports.clone(),
            },
        );
        Ok(reports)
    }

    async fn dispatch_messages(
        &self,
        messages: &[MessageSpec],
        options: &SendOptions,
    ) -> Result<SendResult, SmsUpError> {
        let api_key = self.api_key()?;
        let validated = self.validator.validate_batch(messages)?;

        let request = transport::compose_send_request(
            api_key,
            &validated,
            options,
            &self.config,
            self.report_route.as_deref(),
            SendAt::now(),
        )
        .map_err(|err| SmsUpError::Encode(Box::new(err)))?;

        let response = self.post(request.endpoint, request.payload).await?;
        let decoded = transport::decode_send_json_response(&response.body)
            .map_err(|err| SmsUpError::invalid_response(response.status, err))?;
        let result = ensure_ok(decoded, response.status)?;

        logging::sent(&self.config.logging, validated.len(), &result);
        self.publish(
            "messages_sent",
            SmsEvent::MessagesSent {
                messages: validated,
                result: result.clone(),
            },
        );
        Ok(result)
    }

    async fn lookup_phone(&self, phone: &str) -> Result<bool, SmsUpError> {
        let api_key = self.api_key()?;
        let msisdn = Recipient::new(phone)?;
        let payload = transport::encode_phone_check_payload(api_key, &msisdn);
        let response = self.post(Endpoint::PhoneCheck, payload).await?;
        let decoded = transport::decode_phone_check_json_response(&response.body)
            .map_err(|err| SmsUpError::invalid_response(response.status, err))?;
        Ok(ensure_ok(decoded, response.status)?.success)
    }

    async fn fetch_balance(&self) -> Result<String, SmsUpError> {
        let api_key = self.api_key()?;
        let payload = transport::encode_balance_payload(api_key);
        let response = self.post(Endpoint::Balance, payload).await?;
        let decoded = transport::decode_balance_json_response(&response.body)
            .map_err(|err| SmsUpError::invalid_response(response.status, err))?;
        ensure_ok(decoded, response.status)?
            .balance
            .ok_or_else(|| {
                SmsUpError::invalid_response(
                    response.status,
                    TransportError::MissingField {
                        field: "result.balance",
                    },
                )
            })
    }

    fn api_key(&self) -> Result<&ApiKey, SmsUpError> {
        self.api_key.as_ref().ok_or(SmsUpError::MissingApiKey)
    }

    async fn post(&self, endpoint: Endpoint, payload: Value) -> Result<HttpResponse, SmsUpError> {
        let url = self
            .base_url
            .join(endpoint.path())
            .map_err(|err| SmsUpError::Configuration(err.to_string()))?;
        tracing::debug!(url = %url, "smsup: posting request");
        self.http
            .post_json(url.as_str(), payload)
            .await
            .map_err(SmsUpError::Transport)
    }

    fn publish(&self, name: &'static str, event: SmsEvent) {
        let Some(publisher) = self.publisher.as_ref() else {
            return;
        };
        if let Err(err) = publisher.publish(&event) {
            logging::publish_failed(&self.config.logging, name, err.as_ref());
        }
    }
}

/// Parse a delivery-report webhook body without a client.
///
/// Malformed records are skipped; a body that is not a JSON array fails with
/// [`SmsUpError::InvalidResponse`].
pub fn parse_delivery_reports(body: &str) -> Result<Vec<DeliveryReport>, SmsUpError> {
    transport::decode_delivery_reports(body).map_err(|err| SmsUpError::invalid_response(200, err))
}

/// Success requires both a 2xx status and a gateway status of `ok`.
fn ensure_ok<T>(decoded: Decoded<T>, status: u16) -> Result<T, SmsUpError> {
    let Decoded {
        envelope,
        value,
        body,
    } = decoded;
    if envelope.is_ok() && (200..=299).contains(&status) {
        return Ok(value);
    }
    let Envelope {
        error_id,
        error_message,
        ..
    } = envelope;
    Err(SmsUpError::Service {
        error_id,
        message: error_message
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| UNKNOWN_ERROR.to_owned()),
        status,
        body,
    })
}
