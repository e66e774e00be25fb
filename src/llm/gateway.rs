// ABOUTME: HTTP implementation of the AI gateway client
// ABOUTME: Posts JSON payloads to the remote summarize/chat endpoints with bounded timeouts

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error};

use super::{AiGateway, ConverseRequest, GatewayResponse, SummarizeRequest};
use crate::config::ServerConfig;
use crate::errors::AppError;

/// Service name used in error messages
const SERVICE_NAME: &str = "AI gateway";

/// HTTP client for the remote AI service.
///
/// Calls are bounded by connect and request timeouts so a stalled upstream
/// cannot hold a request open indefinitely. No retries: callers decide
/// whether a failure is fatal.
pub struct HttpAiGateway {
    client: Client,
    base_url: String,
}

impl HttpAiGateway {
    /// Create a gateway client from server configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &ServerConfig) -> Result<Self, AppError> {
        Self::with_timeouts(
            &config.ai_gateway_url,
            config.gateway_connect_timeout,
            config.gateway_request_timeout,
        )
    }

    /// Create a gateway client with explicit timeouts
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_timeouts(
        base_url: &str,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self, AppError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Build the URL for a gateway endpoint
    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.base_url)
    }

    /// POST a payload and extract the single `response` field
    async fn post_for_response<T: serde::Serialize + Sync>(
        &self,
        endpoint: &str,
        payload: &T,
    ) -> Result<String, AppError> {
        let url = self.endpoint_url(endpoint);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to reach {SERVICE_NAME} at {url}: {e}");
                if e.is_connect() || e.is_timeout() {
                    AppError::external_unavailable(format!(
                        "Cannot reach {SERVICE_NAME} at {url}: {e}"
                    ))
                } else {
                    AppError::external_unavailable(format!("{SERVICE_NAME} request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!("Failed to read {SERVICE_NAME} response: {e}");
            AppError::external_unavailable(format!("Failed to read {SERVICE_NAME} response: {e}"))
        })?;

        if !status.is_success() {
            error!("{SERVICE_NAME} returned {status}: {}", truncate(&body));
            return Err(AppError::external_unavailable(format!(
                "{SERVICE_NAME} returned {status}"
            )));
        }

        let parsed: GatewayResponse = serde_json::from_str(&body).map_err(|e| {
            error!(
                "Failed to parse {SERVICE_NAME} response: {e} - body: {}",
                truncate(&body)
            );
            AppError::external_unavailable(format!("Malformed {SERVICE_NAME} response: {e}"))
        })?;

        Ok(parsed.response)
    }
}

/// Truncate a response body for log output
fn truncate(body: &str) -> String {
    body.chars().take(200).collect()
}

#[async_trait]
impl AiGateway for HttpAiGateway {
    async fn summarize(&self, text: &str) -> Result<String, AppError> {
        debug!("Requesting summary ({} chars)", text.len());
        let payload = SummarizeRequest {
            message: text.to_owned(),
        };
        self.post_for_response("summarize", &payload).await
    }

    async fn converse(&self, transcript: &str, context: &str) -> Result<String, AppError> {
        debug!(
            "Requesting chat reply (transcript {} chars, context {} chars)",
            transcript.len(),
            context.len()
        );
        let payload = ConverseRequest {
            message: transcript.to_owned(),
            context: context.to_owned(),
        };
        self.post_for_response("chat", &payload).await
    }
}
