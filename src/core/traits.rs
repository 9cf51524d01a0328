use async_trait::async_trait;

use super::{error::LlmError, types::RawProviderResponse};

/// A remote text-completion backend bound to one credential and one model.
///
/// Implementations hold no per-call state and must be safe to share between
/// concurrent callers.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send a single prompt. `Ok(None)` means the call succeeded but the
    /// provider returned no response object at all.
    async fn generate(&self, prompt: &str) -> Result<Option<RawProviderResponse>, LlmError>;

    /// Model identifier the handle is bound to.
    fn model(&self) -> &str;
}
