use std::fmt;

use thiserror::Error;

/// Provider-neutral view of a completion response.
///
/// Everything here is untrusted input. An empty `candidates` list or an empty
/// `parts` list is a normal outcome, not a decoding error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawProviderResponse {
    pub candidates: Vec<Candidate>,
}

/// One alternative response offered by the provider for a single prompt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candidate {
    pub parts: Vec<Part>,
}

/// One fragment of a candidate's content.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(String),
    InlineData { mime_type: String },
    FunctionCall { name: String },
    /// A part shape this crate does not know about.
    Other,
}

impl Part {
    /// Short name of the part variant, used in failure details.
    pub fn kind(&self) -> &'static str {
        match self {
            Part::Text(_) => "text",
            Part::InlineData { .. } => "inline_data",
            Part::FunctionCall { .. } => "function_call",
            Part::Other => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Transport, auth, quota, timeout or decoding failure from the provider call.
    ProviderError,
    /// The call succeeded but produced nothing usable.
    EmptyResponse,
    /// The first part of the first candidate is not text.
    UnsupportedPartType,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::ProviderError => write!(f, "ProviderError"),
            FailureKind::EmptyResponse => write!(f, "EmptyResponse"),
            FailureKind::UnsupportedPartType => write!(f, "UnsupportedPartType"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {detail}")]
pub struct CompletionFailure {
    pub kind: FailureKind,
    pub detail: String,
}

impl CompletionFailure {
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

/// Outcome of one relay exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionResult {
    Reply(String),
    Failure(CompletionFailure),
}

impl CompletionResult {
    pub(crate) fn failure(kind: FailureKind, detail: impl Into<String>) -> Self {
        CompletionResult::Failure(CompletionFailure::new(kind, detail))
    }

    pub fn is_reply(&self) -> bool {
        matches!(self, CompletionResult::Reply(_))
    }

    pub fn reply(&self) -> Option<&str> {
        match self {
            CompletionResult::Reply(text) => Some(text),
            CompletionResult::Failure(_) => None,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            CompletionResult::Reply(_) => None,
            CompletionResult::Failure(failure) => Some(failure.kind),
        }
    }

    pub fn into_result(self) -> Result<String, CompletionFailure> {
        match self {
            CompletionResult::Reply(text) => Ok(text),
            CompletionResult::Failure(failure) => Err(failure),
        }
    }
}
