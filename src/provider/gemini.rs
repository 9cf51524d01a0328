//! Google Gemini `generateContent` provider.
//!
//! The wire structs keep only the fields the relay reads plus a few that are
//! useful in logs. Unknown fields are ignored by serde.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::{
    Candidate, CompletionProvider, HttpClient, HttpClientConfig, LlmError, Part,
    RawProviderResponse,
};
use crate::provider::{Provider, constants::gemini};

/// Gemini-specific configuration for the client.
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub http_config: HttpClientConfig,
}

impl GeminiConfig {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: gemini::DEFAULT_MODEL.to_string(),
            base_url: gemini::API_BASE.to_string(),
            http_config: HttpClientConfig::default(),
        }
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_http_config(mut self, config: HttpClientConfig) -> Self {
        self.http_config = config;
        self
    }

    pub fn provider(&self) -> Provider {
        Provider::Gemini
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    fn auth_header(&self) -> (String, String) {
        (gemini::API_KEY_HEADER.to_string(), self.api_key.clone())
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("http_config", &self.http_config)
            .finish()
    }
}

/// Long-lived handle bound to one API key and one model.
pub struct GeminiClient {
    config: GeminiConfig,
    http: HttpClient,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, LlmError> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::ProviderConfiguration(
                "Gemini API key is empty".to_string(),
            ));
        }
        if config.model.trim().is_empty() {
            return Err(LlmError::ProviderConfiguration(
                "Gemini model id is empty".to_string(),
            ));
        }

        let http = HttpClient::new(config.http_config.clone())?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.config.model)
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CompletionProvider for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<Option<RawProviderResponse>, LlmError> {
        let request = GenerateContentRequest::from_prompt(prompt);
        let headers = [self.config.auth_header()];

        let response: Option<GenerateContentResponse> = self
            .http
            .post_json(&self.config.endpoint(), &headers, &request)
            .await?;

        Ok(response.map(|response| {
            if let Some(reason) = response
                .prompt_feedback
                .as_ref()
                .and_then(|feedback| feedback.block_reason.as_deref())
            {
                tracing::debug!(block_reason = reason, "Gemini blocked the prompt");
            }
            response.into()
        }))
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

impl<'a> GenerateContentRequest<'a> {
    fn from_prompt(prompt: &'a str) -> Self {
        Self {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    parts: Option<Vec<GeminiPart>>,
}

/// A Gemini part is an object with exactly one payload key set.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    text: Option<String>,
    inline_data: Option<InlineData>,
    function_call: Option<FunctionCall>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: Option<String>,
}

impl From<GeminiPart> for Part {
    fn from(part: GeminiPart) -> Self {
        match part {
            GeminiPart {
                text: Some(text), ..
            } => Part::Text(text),
            GeminiPart {
                inline_data: Some(data),
                ..
            } => Part::InlineData {
                mime_type: data.mime_type.unwrap_or_default(),
            },
            GeminiPart {
                function_call: Some(call),
                ..
            } => Part::FunctionCall {
                name: call.name.unwrap_or_default(),
            },
            _ => Part::Other,
        }
    }
}

impl From<GeminiCandidate> for Candidate {
    fn from(candidate: GeminiCandidate) -> Self {
        Candidate {
            parts: candidate
                .content
                .and_then(|content| content.parts)
                .map(|parts| parts.into_iter().map(Part::from).collect())
                .unwrap_or_default(),
        }
    }
}

impl From<GenerateContentResponse> for RawProviderResponse {
    fn from(response: GenerateContentResponse) -> Self {
        RawProviderResponse {
            candidates: response
                .candidates
                .unwrap_or_default()
                .into_iter()
                .map(Candidate::from)
                .collect(),
        }
    }
}
