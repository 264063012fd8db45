use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use statuscheck_core::CompanyRecord;

use crate::prompt::{build_user_message, SYSTEM_PROMPT};
use crate::wire::{error_message, GenerateContentRequest, GenerateContentResponse};
use crate::{BatchError, BatchResponse, FailureKind};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const API_KEY_HEADER: &str = "x-goog-api-key";
/// Bytes of an error body inspected for a service message.
const ERROR_BODY_LIMIT: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_response_bytes: u64,
    /// Let the service ground its answer in live web search.
    pub enable_search: bool,
}

impl ClientSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
            max_response_bytes: 4 * 1024 * 1024,
            enable_search: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("API key is not set")]
    MissingApiKey,
    #[error("invalid endpoint {url}: {message}")]
    InvalidEndpoint { url: String, message: String },
    #[error("failed to build HTTP client: {0}")]
    Transport(String),
}

/// One external text-generation call per batch.
#[async_trait::async_trait]
pub trait AnalysisClient: Send + Sync {
    async fn analyze(&self, batch: &[CompanyRecord]) -> Result<BatchResponse, BatchError>;
}

/// [`AnalysisClient`] backed by the Gemini `generateContent` REST endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    settings: ClientSettings,
    endpoint: reqwest::Url,
    http: reqwest::Client,
}

impl GeminiClient {
    /// Fails fast when the API key is blank or the endpoint cannot be formed.
    pub fn new(settings: ClientSettings) -> Result<Self, ConfigurationError> {
        if settings.api_key.trim().is_empty() {
            return Err(ConfigurationError::MissingApiKey);
        }
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            settings.base_url.trim_end_matches('/'),
            settings.model
        );
        let endpoint = reqwest::Url::parse(&url).map_err(|err| {
            ConfigurationError::InvalidEndpoint {
                url: url.clone(),
                message: err.to_string(),
            }
        })?;
        let http = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ConfigurationError::Transport(err.to_string()))?;

        Ok(Self {
            settings,
            endpoint,
            http,
        })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<Vec<u8>, BatchError> {
        let max_bytes = self.settings.max_response_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, Some(content_len)));
            }
        }

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = body.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, Some(next_len)));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

#[async_trait::async_trait]
impl AnalysisClient for GeminiClient {
    async fn analyze(&self, batch: &[CompanyRecord]) -> Result<BatchResponse, BatchError> {
        let request = GenerateContentRequest::new(
            SYSTEM_PROMPT,
            build_user_message(batch),
            self.settings.enable_search,
        );
        let payload = serde_json::to_vec(&request)
            .map_err(|err| BatchError::service(FailureKind::MalformedBody, err.to_string()))?;

        engine_debug!(
            "POST {} companies={} payload_len={}",
            self.endpoint,
            batch.len(),
            payload.len()
        );
        let response = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, self.settings.api_key.as_str())
            .body(payload)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let prefix = read_prefix(response, ERROR_BODY_LIMIT).await;
            let message = error_message(&prefix).unwrap_or_else(|| status.to_string());
            engine_warn!("Analysis service returned {}: {}", status, message);
            return Err(BatchError::service(
                FailureKind::HttpStatus(status.as_u16()),
                message,
            ));
        }
        let body = self.read_body(response).await?;

        let parsed: GenerateContentResponse = serde_json::from_slice(&body)
            .map_err(|err| BatchError::service(FailureKind::MalformedBody, err.to_string()))?;
        if let Some(reason) = parsed.block_reason() {
            return Err(BatchError::service(
                FailureKind::Blocked,
                format!("request blocked: {reason}"),
            ));
        }

        Ok(BatchResponse {
            raw_text: parsed.text(),
            citations: parsed.citations(),
        })
    }
}

/// First `limit` bytes of the body. Transport errors end the read early.
async fn read_prefix(response: reqwest::Response, limit: usize) -> Vec<u8> {
    let mut prefix = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(Ok(chunk)) = stream.next().await {
        let room = limit - prefix.len();
        if chunk.len() >= room {
            prefix.extend_from_slice(&chunk[..room]);
            break;
        }
        prefix.extend_from_slice(&chunk);
    }
    prefix
}

fn too_large(max_bytes: u64, actual: Option<u64>) -> BatchError {
    BatchError::service(
        FailureKind::TooLarge { max_bytes, actual },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> BatchError {
    if err.is_timeout() {
        return BatchError::service(FailureKind::Timeout, err.to_string());
    }
    BatchError::service(FailureKind::Network, err.to_string())
}
