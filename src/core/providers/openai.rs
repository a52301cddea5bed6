//! OpenAI provider implementation

use crate::core::provider::{Provider, ProviderError};
use crate::models::openai::{ChatCompletionRequest, ChatCompletionResponse};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// OpenAI provider (any OpenAI-compatible `/chat/completions` endpoint)
pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
    timeout: u64,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider
    ///
    /// # Arguments
    ///
    /// * `api_key` - OpenAI API key
    /// * `base_url` - API base URL, without the `/chat/completions` suffix
    /// * `timeout` - Request timeout in seconds
    pub fn new(api_key: String, base_url: String, timeout: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Map an upstream error body to a hint naming the setting to fix
    ///
    /// Bodies that match no known pattern are passed through unchanged.
    fn classify_error(error_detail: &str) -> String {
        const HINTS: &[(&[&str], &str)] = &[
            (
                &["invalid_api_key", "incorrect api key", "unauthorized"],
                "Upstream rejected the API key. Check OPENAI_API_KEY or [openai] api_key.",
            ),
            (
                &["insufficient_quota", "quota", "billing", "payment"],
                "Upstream quota or billing exhausted for the configured API key.",
            ),
            (
                &["rate_limit"],
                "Upstream rate limit hit. Requests are not retried; try again later.",
            ),
            (
                &["model_not_found", "does not exist"],
                "Upstream does not serve the configured model. Check [openai] model.",
            ),
            (
                &["unsupported_country_region_territory"],
                "Upstream refuses this region. Point [openai] base_url at a reachable endpoint.",
            ),
        ];

        let error_lower = error_detail.to_lowercase();
        HINTS
            .iter()
            .find(|(needles, _)| needles.iter().any(|needle| error_lower.contains(needle)))
            .map(|(_, hint)| hint.to_string())
            .unwrap_or_else(|| error_detail.to_string())
    }

    fn transport_error(&self, error: reqwest::Error) -> ProviderError {
        if error.is_timeout() {
            ProviderError::Timeout(self.timeout)
        } else {
            ProviderError::Connection(error.to_string())
        }
    }
}

#[async_trait]
impl Provider for OpenAIProvider {
    async fn create_chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ProviderError> {
        let url = self.completions_url();
        debug!("POST {} model={}", url, request.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!("Upstream returned {}: {}", status, error_text);
            let classified_error = Self::classify_error(&error_text);
            return Err(ProviderError::from_status(status.as_u16(), classified_error));
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;

        serde_json::from_str(&body)
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {}", e)))
    }

    fn provider_name(&self) -> &str {
        "OpenAI"
    }
}
