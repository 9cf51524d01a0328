//! The relay between a caller's prompt and a completion provider.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::core::{
    CompletionProvider, CompletionResult, FailureKind, LlmError, Part, RawProviderResponse,
};

/// Per-relay call options.
#[derive(Debug, Clone, Default)]
pub struct RelayOptions {
    /// Upper bound on a single provider call. Unbounded when `None`.
    pub timeout: Option<Duration>,
}

impl RelayOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Forwards prompts to a shared provider handle and normalizes the outcome.
///
/// Cheap to clone; clones share the provider.
#[derive(Clone)]
pub struct CompletionRelay {
    provider: Arc<dyn CompletionProvider>,
    options: RelayOptions,
}

impl CompletionRelay {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            provider,
            options: RelayOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RelayOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &RelayOptions {
        &self.options
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    #[tracing::instrument(name = "relay_complete", skip_all, fields(model = %self.provider.model(), prompt_len = prompt.len()))]
    pub async fn complete(&self, prompt: &str) -> CompletionResult {
        let outcome = match self.options.timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.provider.generate(prompt))
                .await
                .unwrap_or(Err(LlmError::Timeout { timeout })),
            None => self.provider.generate(prompt).await,
        };

        let result = classify(outcome);
        if let CompletionResult::Failure(failure) = &result {
            tracing::debug!(kind = %failure.kind, detail = %failure.detail, "relay failure");
        }
        result
    }

    /// Like [`complete`](Self::complete) but gives up as soon as `token` is cancelled.
    pub async fn complete_with_cancellation(
        &self,
        prompt: &str,
        token: &CancellationToken,
    ) -> CompletionResult {
        tokio::select! {
            biased;
            _ = token.cancelled() => classify(Err(LlmError::Cancelled)),
            result = self.complete(prompt) => result,
        }
    }
}

impl std::fmt::Debug for CompletionRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionRelay")
            .field("model", &self.provider.model())
            .field("options", &self.options)
            .finish()
    }
}

/// One-shot form for callers that hold a provider directly.
pub async fn complete(client: &dyn CompletionProvider, prompt: &str) -> CompletionResult {
    classify(client.generate(prompt).await)
}

fn classify(outcome: Result<Option<RawProviderResponse>, LlmError>) -> CompletionResult {
    match outcome {
        Err(err) => CompletionResult::failure(FailureKind::ProviderError, error_chain(&err)),
        Ok(response) => extract_reply(response),
    }
}

/// Render an error followed by each of its causes, `outer: inner: root`.
fn error_chain(err: &LlmError) -> String {
    let mut detail = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        detail.push_str(": ");
        detail.push_str(&cause.to_string());
        source = cause.source();
    }
    detail
}

/// Pull the reply out of a provider response.
///
/// Only the first candidate and its first part are considered.
pub fn extract_reply(response: Option<RawProviderResponse>) -> CompletionResult {
    let Some(candidate) = response.and_then(|r| r.candidates.into_iter().next()) else {
        return CompletionResult::failure(FailureKind::EmptyResponse, "no candidates");
    };

    match candidate.parts.into_iter().next() {
        None => CompletionResult::failure(
            FailureKind::EmptyResponse,
            "no parts in first candidate",
        ),
        Some(Part::Text(text)) => CompletionResult::Reply(text),
        Some(other) => CompletionResult::failure(
            FailureKind::UnsupportedPartType,
            format!("first part is {}, not text", other.kind()),
        ),
    }
}
