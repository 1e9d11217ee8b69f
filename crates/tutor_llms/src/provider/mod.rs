//! Provider trait

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{GenerateRequest, GenerateResponse, Headers};

/// A chat-completion backend: one request in, one text reply out.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable identifier used in logs.
    fn provider_id(&self) -> &str;

    /// Headers sent with every request.
    fn build_headers(&self) -> Headers;

    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse>;
}
