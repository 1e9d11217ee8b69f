//! OpenAI provider implementation

use super::convert::{error_message, from_openai_response, to_openai_request};
use super::types::{OpenAIConfig, OpenAIResponse};
use crate::error::{Error, Result};
use crate::provider::Provider;
use crate::types::{GenerateRequest, GenerateResponse, Headers};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

/// OpenAI provider
pub struct OpenAIProvider {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::MissingApiKey("openai".to_string()));
        }

        let client = Client::new();
        Ok(Self { config, client })
    }
}

#[async_trait]
impl Provider for OpenAIProvider {
    fn provider_id(&self) -> &str {
        "openai"
    }

    fn build_headers(&self) -> Headers {
        let mut headers = Headers::new();
        headers.insert("Authorization", format!("Bearer {}", self.config.api_key));
        headers.insert("Content-Type", "application/json");
        headers
    }

    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let openai_req = to_openai_request(&request);
        let headers = self.build_headers();

        debug!(
            model = %openai_req.model,
            messages = openai_req.messages.len(),
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(&url)
            .headers(headers.to_reqwest_headers())
            .json(&openai_req)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::api(
                "OpenAI",
                status.as_u16(),
                error_message(&error_text),
            ));
        }

        let openai_resp: OpenAIResponse = response.json().await?;
        from_openai_response(openai_resp)
    }
}
