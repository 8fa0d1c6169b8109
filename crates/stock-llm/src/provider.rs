//! Chat provider trait definition

use crate::{ChatRequest, Result};
use async_trait::async_trait;

/// Trait for chat completion providers
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send a request and return the text of the first choice
    async fn complete(&self, request: ChatRequest) -> Result<String>;

    /// Provider name (e.g., "openai")
    fn name(&self) -> &str;
}
