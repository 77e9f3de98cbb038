use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
///
/// Only malformed values are errors. Missing credentials leave the matching
/// dependency "not configured" and are reported through readiness instead.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub port: u16,
    pub rust_log: String,
    pub open_router_api_key: Option<Secret>,
    pub llm: LlmSettings,
    pub database_url: Option<Secret>,
    pub knowledge_collection: String,
    pub embedding_url: Option<String>,
    pub embedding_api_key: Option<Secret>,
    /// Refuse to start when the occupation corpus cannot be built.
    pub strict_startup: bool,
}

/// Sampling and transport settings for the completion endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmSettings {
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            temperature: 0.3,
            max_tokens: 1024,
            timeout_secs: 60,
        }
    }
}

/// A credential that never appears in `Debug` output or logs.
#[derive(Clone)]
pub struct Secret(String);

impl Secret {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = LlmSettings::default();

        Ok(Config {
            data_dir: PathBuf::from(env_or("DATA_DIR", "data")),
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
            open_router_api_key: optional_env("OPEN_ROUTER_API_KEY").map(Secret),
            llm: LlmSettings {
                base_url: env_or("LLM_BASE_URL", &defaults.base_url),
                temperature: parse_env("LLM_TEMPERATURE", defaults.temperature)?,
                max_tokens: parse_env("LLM_MAX_TOKENS", defaults.max_tokens)?,
                timeout_secs: parse_env("LLM_TIMEOUT_SECS", defaults.timeout_secs)?,
            },
            database_url: optional_env("DATABASE_URL").map(Secret),
            knowledge_collection: env_or("KNOWLEDGE_COLLECTION", "onet_data"),
            embedding_url: optional_env("EMBEDDING_URL"),
            embedding_api_key: optional_env("EMBEDDING_API_KEY").map(Secret),
            strict_startup: parse_env("STRICT_STARTUP", true)?,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Unset and blank values both count as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_is_redacted_in_debug() {
        let secret = Secret("sk-or-very-secret".to_string());
        assert_eq!(format!("{secret:?}"), "Secret(***)");
        assert_eq!(secret.expose(), "sk-or-very-secret");
    }

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let value: u16 = parse_env("COMPASS_TEST_UNSET_PORT", 8080).unwrap();
        assert_eq!(value, 8080);
    }

    #[test]
    fn test_parse_env_rejects_malformed_value() {
        std::env::set_var("COMPASS_TEST_BAD_TOKENS", "lots");
        let result: Result<u32> = parse_env("COMPASS_TEST_BAD_TOKENS", 1024);
        std::env::remove_var("COMPASS_TEST_BAD_TOKENS");
        assert!(result.is_err());
    }

    #[test]
    fn test_blank_optional_value_is_absent() {
        std::env::set_var("COMPASS_TEST_BLANK_KEY", "   ");
        assert_eq!(optional_env("COMPASS_TEST_BLANK_KEY"), None);
        std::env::remove_var("COMPASS_TEST_BLANK_KEY");
    }
}
