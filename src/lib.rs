//! # promptrelay
//!
//! Forward a text prompt to a Gemini model and hand back the reply, from a
//! terminal loop or an HTTP endpoint.
//!
//! The core is [`CompletionRelay`]: it calls a [`CompletionProvider`] and folds
//! whatever comes back (an error, nothing, a non-text part, or text) into a
//! single [`CompletionResult`].
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use promptrelay::{CompletionRelay, CompletionResult, GeminiClient, GeminiConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GeminiClient::new(GeminiConfig::new(std::env::var("API_KEY")?))?;
//!     let relay = CompletionRelay::new(Arc::new(client));
//!
//!     match relay.complete("Explain how AI works").await {
//!         CompletionResult::Reply(text) => println!("{text}"),
//!         CompletionResult::Failure(failure) => eprintln!("{failure}"),
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod core;
pub mod provider;
pub mod relay;
pub mod terminal;

pub use config::{Config, ConfigError};
pub use crate::core::{
    Candidate, CompletionFailure, CompletionProvider, CompletionResult, FailureKind, LlmError,
    Part, RawProviderResponse,
};
pub use provider::{GeminiClient, GeminiConfig, Provider};
pub use relay::{CompletionRelay, RelayOptions};
pub use terminal::{FailurePolicy, SessionSummary, TerminalError, TerminalSession};
