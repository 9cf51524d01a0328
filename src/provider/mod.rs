pub(crate) mod constants;
pub mod gemini;

pub use constants::gemini::{API_BASE, DEFAULT_MODEL};
pub use gemini::{GeminiClient, GeminiConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Gemini,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Gemini => write!(f, "Gemini"),
        }
    }
}

impl Provider {
    /// Environment variables consulted for this provider's API key, in order.
    pub fn api_key_env_vars(&self) -> &'static [&'static str] {
        match self {
            Provider::Gemini => &[
                constants::gemini::API_KEY_ENV_VAR,
                constants::gemini::FALLBACK_API_KEY_ENV_VAR,
            ],
        }
    }
}
