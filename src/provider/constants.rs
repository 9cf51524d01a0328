pub mod gemini {
    pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
    pub const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
    pub const API_KEY_HEADER: &str = "x-goog-api-key";
    pub const API_KEY_ENV_VAR: &str = "API_KEY";
    pub const FALLBACK_API_KEY_ENV_VAR: &str = "GEMINI_API_KEY";
}
