use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::core::CompletionResult;

pub const INVALID_REQUEST_REPLY: &str = "Invalid request format.";
pub const PROVIDER_FAILURE_REPLY: &str = "AI error, try again later.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Body for every `/chat` outcome, success or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

impl ChatResponse {
    fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> (StatusCode, Json<ChatResponse>) {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "rejecting malformed chat request");
            return (
                StatusCode::BAD_REQUEST,
                Json(ChatResponse::new(INVALID_REQUEST_REPLY)),
            );
        }
    };

    match state.relay.complete(&request.message).await {
        CompletionResult::Reply(text) => (StatusCode::OK, Json(ChatResponse::new(text))),
        CompletionResult::Failure(failure) => {
            tracing::error!(kind = %failure.kind, detail = %failure.detail, "chat relay failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ChatResponse::new(PROVIDER_FAILURE_REPLY)),
            )
        }
    }
}
