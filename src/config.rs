//! Process configuration read from the environment (and `.env`).

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::ValueEnum;
use thiserror::Error;

use crate::core::HttpClientConfig;
use crate::provider::{API_BASE, DEFAULT_MODEL, GeminiConfig, Provider};
use crate::relay::RelayOptions;
use crate::terminal::FailurePolicy;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing API key. Set {0} in the environment or in a .env file")]
    MissingApiKey(String),

    #[error("Invalid value '{value}' for {var}: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub provider: ProviderSettings,
    pub server: ServerConfig,
    pub terminal: TerminalConfig,
}

#[derive(Clone)]
pub struct ProviderSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    /// Request timeout. `None` matches a provider call with no deadline.
    pub timeout: Option<Duration>,
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: PathBuf,
}

#[derive(Debug, Clone, Copy)]
pub struct TerminalConfig {
    pub on_failure: FailurePolicy,
}

impl Config {
    /// Read configuration from the process environment.
    ///
    /// Call `dotenv` before this if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());

        let key_vars = Provider::Gemini.api_key_env_vars();
        let api_key = key_vars
            .iter()
            .find_map(|&var| get(var))
            .ok_or_else(|| ConfigError::MissingApiKey(key_vars.join(" or ")))?;

        let timeout = parse_opt::<u64>(&get, "RELAY_TIMEOUT_SECS")?
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Ok(Self {
            provider: ProviderSettings {
                api_key,
                model: get("RELAY_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                base_url: get("RELAY_BASE_URL").unwrap_or_else(|| API_BASE.to_string()),
                timeout,
            },
            server: ServerConfig {
                host: get("RELAY_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_opt(&get, "RELAY_PORT")?.unwrap_or(8080),
                static_dir: get("RELAY_STATIC_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("static")),
            },
            terminal: TerminalConfig {
                on_failure: parse_policy(&get)?.unwrap_or_default(),
            },
        })
    }

    pub fn gemini_config(&self) -> GeminiConfig {
        let mut http_config = HttpClientConfig::default();
        if let Some(timeout) = self.provider.timeout {
            http_config = http_config.with_timeout(timeout);
        }

        GeminiConfig::new(self.provider.api_key.clone())
            .with_model(self.provider.model.clone())
            .with_base_url(self.provider.base_url.clone())
            .with_http_config(http_config)
    }

    pub fn relay_options(&self) -> RelayOptions {
        RelayOptions {
            timeout: self.provider.timeout,
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_opt<T>(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get(var)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidValue {
                    var,
                    reason: e.to_string(),
                    value,
                })
        })
        .transpose()
}

fn parse_policy(
    get: &impl Fn(&str) -> Option<String>,
) -> Result<Option<FailurePolicy>, ConfigError> {
    const VAR: &str = "RELAY_ON_FAILURE";
    get(VAR)
        .map(|value| {
            FailurePolicy::from_str(value.trim(), true).map_err(|reason| {
                ConfigError::InvalidValue {
                    var: VAR,
                    value,
                    reason,
                }
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let config = config_from(&[("API_KEY", "secret")]).unwrap();

        assert_eq!(config.provider.api_key, "secret");
        assert_eq!(config.provider.model, "gemini-2.0-flash");
        assert_eq!(config.provider.base_url, API_BASE);
        assert_eq!(config.provider.timeout, None);
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert_eq!(config.server.static_dir, PathBuf::from("static"));
        assert_eq!(config.terminal.on_failure, FailurePolicy::Continue);
    }

    #[test]
    fn missing_key_fails_fast() {
        let err = config_from(&[("RELAY_MODEL", "gemini-pro")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingApiKey("API_KEY or GEMINI_API_KEY".to_string())
        );

        assert!(config_from(&[("API_KEY", "   ")]).is_err());
    }

    #[test]
    fn fallback_key_variable_is_used() {
        let config = config_from(&[("GEMINI_API_KEY", "fallback")]).unwrap();
        assert_eq!(config.provider.api_key, "fallback");
    }

    #[test]
    fn overrides_are_parsed() {
        let config = config_from(&[
            ("API_KEY", "secret"),
            ("RELAY_MODEL", "gemini-1.5-pro"),
            ("RELAY_TIMEOUT_SECS", "30"),
            ("RELAY_HOST", "127.0.0.1"),
            ("RELAY_PORT", "9000"),
            ("RELAY_STATIC_DIR", "/srv/www"),
            ("RELAY_ON_FAILURE", "abort"),
        ])
        .unwrap();

        assert_eq!(config.provider.model, "gemini-1.5-pro");
        assert_eq!(config.provider.timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.relay_options().timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.server_addr(), "127.0.0.1:9000");
        assert_eq!(config.server.static_dir, PathBuf::from("/srv/www"));
        assert_eq!(config.terminal.on_failure, FailurePolicy::Abort);
    }

    #[test]
    fn zero_timeout_means_unbounded() {
        let config = config_from(&[("API_KEY", "k"), ("RELAY_TIMEOUT_SECS", "0")]).unwrap();
        assert_eq!(config.provider.timeout, None);
    }

    #[test]
    fn invalid_port_is_reported() {
        let err = config_from(&[("API_KEY", "k"), ("RELAY_PORT", "eighty")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                var: "RELAY_PORT",
                ..
            }
        ));
    }

    #[test]
    fn failure_policy_is_case_insensitive_and_validated() {
        let config = config_from(&[("API_KEY", "k"), ("RELAY_ON_FAILURE", " Abort ")]).unwrap();
        assert_eq!(config.terminal.on_failure, FailurePolicy::Abort);

        let err = config_from(&[("API_KEY", "k"), ("RELAY_ON_FAILURE", "retry")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                var: "RELAY_ON_FAILURE",
                ..
            }
        ));
    }

    #[test]
    fn debug_output_hides_key() {
        let config = config_from(&[("API_KEY", "super-secret")]).unwrap();
        assert!(!format!("{config:?}").contains("super-secret"));
    }
}
