use async_trait::async_trait;

use crate::error::Result;

// =============================================================================
// ChatModel Trait
// =============================================================================

/// A language model that turns a single text prompt into a free-text completion.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Model identifier, for logging.
    fn name(&self) -> &str;
}
