//! Client layer: validates input, drives the HTTP round trip, and classifies responses.

use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use url::Url;

use crate::domain::{ApiError, ApiKey, MessageRequest, MessageResponse, PhoneNumber, ValidationError};

const DEFAULT_BASE_URL: &str = "https://api.textfully.dev/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_USER_AGENT: &str = concat!("textfully-rust/", env!("CARGO_PKG_VERSION"));
const MESSAGES_PATH: &str = "messages";

const INVALID_JSON_RESPONSE: &str = "invalid JSON response";
const UNDECODABLE_ERROR_RESPONSE: &str = "failed to decode error response";
const TIMEOUT_ERROR_TYPE: &str = "timeout_error";
const TIMED_OUT: &str = "request timed out, please try again";

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone)]
struct HttpRequest {
    url: Url,
    headers: Vec<(&'static str, String)>,
    body: String,
    timeout: Duration,
}

#[derive(Debug, Clone)]
struct HttpResponse {
    status: u16,
    body: String,
}

#[derive(Debug)]
enum TransportFailure {
    /// The request could not be assembled (bad header value, unsupported URL scheme).
    Build(Box<dyn StdError + Send + Sync>),
    TimedOut,
    Request(Box<dyn StdError + Send + Sync>),
}

impl From<reqwest::Error> for TransportFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::TimedOut
        } else if err.is_builder() {
            Self::Build(Box::new(err))
        } else {
            Self::Request(Box::new(err))
        }
    }
}

trait HttpTransport: Send + Sync {
    fn post<'a>(
        &'a self,
        request: HttpRequest,
    ) -> BoxFuture<'a, Result<HttpResponse, TransportFailure>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl HttpTransport for ReqwestTransport {
    fn post<'a>(
        &'a self,
        request: HttpRequest,
    ) -> BoxFuture<'a, Result<HttpResponse, TransportFailure>> {
        Box::pin(async move {
            let mut builder = self
                .client
                .post(request.url)
                .timeout(request.timeout)
                .body(request.body);
            for (name, value) in request.headers {
                builder = builder.header(name, value);
            }

            let response = builder.send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Coarse classification of a [`TextfullyError`].
pub enum ErrorKind {
    /// No API key was configured.
    Configuration,
    /// Caller input was rejected before any I/O.
    Validation,
    /// The HTTP request could not be built (bad base URL, unserializable payload).
    RequestConstruction,
    /// The request exceeded the configured timeout.
    Timeout,
    /// Any other network-level failure.
    Transport,
    /// The response body was not the JSON the API promises.
    Protocol,
    /// HTTP 401 with a well-formed error envelope.
    Authentication,
    /// HTTP 400 with a well-formed error envelope.
    BadRequest,
    /// Any other non-2xx status with a well-formed error envelope.
    Api,
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`TextfullyClient`].
///
/// Variants that originate from an HTTP response carry the [`ApiError`], so the status
/// code, error type and message stay available via [`TextfullyError::api_error`].
pub enum TextfullyError {
    /// No API key was provided; detected before any network call.
    #[error(
        "no API key provided; pass one to TextfullyClient::new(\"tx_apikey\") or set TEXTFULLY_API_KEY"
    )]
    MissingApiKey,

    /// One of the domain constructors rejected an invalid value.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The request payload could not be serialized.
    #[error("failed to serialize message: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The HTTP request could not be constructed (e.g. malformed base URL).
    #[error("failed to create request: {0}")]
    RequestBuild(#[source] Box<dyn StdError + Send + Sync>),

    /// The request did not complete within the configured timeout.
    ///
    /// The [`ApiError`] has status code `0` and type `timeout_error`.
    #[error("{}", .0.message)]
    Timeout(ApiError),

    /// Connection refused, DNS, TLS or other transport failure.
    #[error("request failed: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// The response body (success or error envelope) could not be decoded.
    #[error(transparent)]
    Protocol(ApiError),

    /// HTTP 401.
    #[error("authentication failed: {0}")]
    Authentication(#[source] ApiError),

    /// HTTP 400.
    #[error("bad request: {0}")]
    BadRequest(#[source] ApiError),

    /// Any other non-2xx status.
    #[error("API request failed: {0}")]
    Api(#[source] ApiError),
}

impl TextfullyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingApiKey => ErrorKind::Configuration,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Serialize(_) | Self::RequestBuild(_) => ErrorKind::RequestConstruction,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Protocol(_) => ErrorKind::Protocol,
            Self::Authentication(_) => ErrorKind::Authentication,
            Self::BadRequest(_) => ErrorKind::BadRequest,
            Self::Api(_) => ErrorKind::Api,
        }
    }

    /// The structured error, when this failure came from an HTTP response or a timeout.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Timeout(err)
            | Self::Protocol(err)
            | Self::Authentication(err)
            | Self::BadRequest(err)
            | Self::Api(err) => Some(err),
            _ => None,
        }
    }

    /// HTTP status code of the response that caused this error, if one was received.
    pub fn status_code(&self) -> Option<u16> {
        self.api_error()
            .map(|err| err.status_code)
            .filter(|status| *status != 0)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

#[derive(Debug, Clone)]
/// Builder for [`TextfullyClient`].
///
/// Use this when you need to customize the base URL, timeout, user-agent or the
/// underlying `reqwest::Client`.
pub struct TextfullyClientBuilder {
    api_key: ApiKey,
    base_url: String,
    timeout: Duration,
    user_agent: String,
    http_client: Option<reqwest::Client>,
}

impl TextfullyClientBuilder {
    /// Create a builder with the default base URL and a 30 second timeout.
    pub fn new(api_key: impl Into<ApiKey>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            http_client: None,
        }
    }

    /// Override the API base URL; `/messages` is appended to it.
    ///
    /// The value is not checked here. A malformed URL is reported by
    /// [`TextfullyClient::send`] as [`TextfullyError::RequestBuild`].
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the timeout applied to each request as a whole.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Reuse an existing `reqwest::Client` (proxies, custom TLS, shared pool).
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Build a [`TextfullyClient`].
    pub fn build(self) -> TextfullyClient {
        let client = self.http_client.unwrap_or_default();
        TextfullyClient {
            api_key: self.api_key,
            base_url: self.base_url,
            timeout: self.timeout,
            user_agent: self.user_agent,
            http: Arc::new(ReqwestTransport { client }),
        }
    }
}

#[derive(Clone)]
/// High-level Textfully client.
///
/// Holds only immutable configuration, so one instance can serve concurrent sends.
/// Each [`send`](Self::send) performs at most one HTTP round trip and never retries.
pub struct TextfullyClient {
    api_key: ApiKey,
    base_url: String,
    timeout: Duration,
    user_agent: String,
    http: Arc<dyn HttpTransport>,
}

impl fmt::Debug for TextfullyClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextfullyClient")
            .field("api_key", &self.api_key)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

impl TextfullyClient {
    /// Environment variable that overrides the base URL in [`TextfullyClient::from_env`].
    pub const BASE_URL_ENV: &'static str = "TEXTFULLY_BASE_URL";

    /// Create a client with the default base URL and timeout.
    ///
    /// An empty key is accepted here and reported as [`TextfullyError::MissingApiKey`]
    /// on the first send.
    pub fn new(api_key: impl Into<ApiKey>) -> Self {
        TextfullyClientBuilder::new(api_key).build()
    }

    /// Start building a client with custom settings.
    pub fn builder(api_key: impl Into<ApiKey>) -> TextfullyClientBuilder {
        TextfullyClientBuilder::new(api_key)
    }

    /// Create a client from `TEXTFULLY_API_KEY` and the optional `TEXTFULLY_BASE_URL`.
    pub fn from_env() -> Result<Self, TextfullyError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`TextfullyClient::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, TextfullyError> {
        let api_key = ApiKey::new(lookup(ApiKey::ENV).unwrap_or_default());
        if api_key.is_empty() {
            return Err(TextfullyError::MissingApiKey);
        }

        let mut builder = Self::builder(api_key);
        if let Some(base_url) = lookup(Self::BASE_URL_ENV).filter(|url| !url.trim().is_empty()) {
            builder = builder.base_url(base_url);
        }
        Ok(builder.build())
    }

    /// Send a text message.
    ///
    /// `phone_number` must be in E.164 format (e.g. `+16175555555`). `text` is sent as-is;
    /// the service decides whether it is acceptable.
    ///
    /// Errors:
    /// - [`TextfullyError::MissingApiKey`] and [`TextfullyError::Validation`] before any I/O,
    /// - [`TextfullyError::Timeout`] / [`TextfullyError::Transport`] for network failures,
    /// - [`TextfullyError::Protocol`] when the body is not the expected JSON,
    /// - [`TextfullyError::Authentication`], [`TextfullyError::BadRequest`] or
    ///   [`TextfullyError::Api`] for error responses.
    pub async fn send(
        &self,
        phone_number: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<MessageResponse, TextfullyError> {
        self.ensure_api_key()?;
        let phone_number = PhoneNumber::new(phone_number)?;
        self.dispatch(&MessageRequest::new(phone_number, text)).await
    }

    /// Send an already validated [`MessageRequest`].
    pub async fn send_message(
        &self,
        request: &MessageRequest,
    ) -> Result<MessageResponse, TextfullyError> {
        self.ensure_api_key()?;
        self.dispatch(request).await
    }

    fn ensure_api_key(&self) -> Result<(), TextfullyError> {
        if self.api_key.is_empty() {
            return Err(TextfullyError::MissingApiKey);
        }
        Ok(())
    }

    async fn dispatch(&self, request: &MessageRequest) -> Result<MessageResponse, TextfullyError> {
        let body = crate::transport::encode_message(request).map_err(TextfullyError::Serialize)?;
        let url = self.messages_url()?;

        tracing::debug!(url = %url, timeout_ms = self.timeout.as_millis(), "Sending message");

        let started = Instant::now();
        let response = self
            .http
            .post(HttpRequest {
                url,
                headers: self.headers(),
                body,
                timeout: self.timeout,
            })
            .await
            .map_err(|failure| match failure {
                TransportFailure::Build(err) => TextfullyError::RequestBuild(err),
                TransportFailure::TimedOut => {
                    tracing::warn!(
                        timeout_ms = self.timeout.as_millis(),
                        "Request timed out"
                    );
                    TextfullyError::Timeout(ApiError::new(
                        0,
                        TIMEOUT_ERROR_TYPE,
                        TIMED_OUT,
                    ))
                }
                TransportFailure::Request(err) => {
                    tracing::warn!(error = %err, "Request failed");
                    TextfullyError::Transport(err)
                }
            })?;

        classify_response(response, started.elapsed())
    }

    fn messages_url(&self) -> Result<Url, TextfullyError> {
        let raw = format!("{}/{MESSAGES_PATH}", self.base_url.trim_end_matches('/'));
        Url::parse(&raw).map_err(|err| TextfullyError::RequestBuild(Box::new(err)))
    }

    fn headers(&self) -> Vec<(&'static str, String)> {
        vec![
            ("authorization", format!("Bearer {}", self.api_key.as_str())),
            ("content-type", "application/json".to_owned()),
            ("accept", "application/json".to_owned()),
            ("user-agent", self.user_agent.clone()),
        ]
    }
}

fn classify_response(
    response: HttpResponse,
    latency: Duration,
) -> Result<MessageResponse, TextfullyError> {
    let HttpResponse { status, body } = response;

    if (200..=299).contains(&status) {
        return match crate::transport::decode_message_response(&body) {
            Ok(message) => {
                tracing::info!(
                    status,
                    id = %message.id,
                    message_status = %message.status,
                    latency_ms = latency.as_millis(),
                    "Message accepted"
                );
                Ok(message)
            }
            Err(err) => {
                tracing::error!(status, error = %err, raw_response = %body, "Failed to decode response");
                Err(TextfullyError::Protocol(ApiError::undecodable(
                    status,
                    INVALID_JSON_RESPONSE,
                    err.to_string(),
                )))
            }
        };
    }

    let service_error = crate::transport::decode_error_envelope(&body).map_err(|err| {
        tracing::error!(status, error = %err, raw_response = %body, "Failed to decode error response");
        TextfullyError::Protocol(ApiError::undecodable(
            status,
            UNDECODABLE_ERROR_RESPONSE,
            err.to_string(),
        ))
    })?;

    let api_error = ApiError::new(status, service_error.error_type, service_error.message);
    tracing::warn!(
        status,
        error_type = %api_error.error_type,
        message = %api_error.message,
        latency_ms = latency.as_millis(),
        "Textfully API returned an error"
    );

    Err(match status {
        401 => TextfullyError::Authentication(api_error),
        400 => TextfullyError::BadRequest(api_error),
        _ => TextfullyError::Api(api_error),
    })
}
