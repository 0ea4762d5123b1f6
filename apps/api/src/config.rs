use anyhow::{bail, Context, Result};

use crate::llm_client::DEFAULT_BASE_URL;

/// Application configuration loaded from environment variables.
///
/// `GEMINI_API_KEY` is deliberately optional here: the server still boots
/// without it, and every analysis call then fails closed with a
/// configuration error instead of reaching the network.
#[derive(Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub llm_timeout_secs: u64,
    pub llm_max_attempts: u32,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so tests never touch
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let llm_max_attempts = parse_or(&lookup, "LLM_MAX_ATTEMPTS", 3u32)?;
        if llm_max_attempts == 0 {
            bail!("LLM_MAX_ATTEMPTS must be at least 1");
        }

        let llm_timeout_secs = parse_or(&lookup, "LLM_TIMEOUT_SECS", 60u64)?;
        if llm_timeout_secs == 0 {
            bail!("LLM_TIMEOUT_SECS must be at least 1");
        }

        Ok(Config {
            gemini_api_key: lookup("GEMINI_API_KEY").filter(|key| !key.trim().is_empty()),
            gemini_base_url: lookup("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            llm_timeout_secs,
            llm_max_attempts,
            port: parse_or(&lookup, "PORT", 8080u16)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap();
        assert!(config.gemini_api_key.is_none());
        assert_eq!(config.gemini_base_url, DEFAULT_BASE_URL);
        assert_eq!(config.llm_timeout_secs, 60);
        assert_eq!(config.llm_max_attempts, 3);
        assert_eq!(config.port, 8080);
        assert_eq!(config.rust_log, "info");
    }

    #[test]
    fn test_blank_api_key_is_treated_as_missing() {
        let config = config_from(&[("GEMINI_API_KEY", "   ")]).unwrap();
        assert!(config.gemini_api_key.is_none());
    }

    #[test]
    fn test_api_key_and_overrides_are_read() {
        let config = config_from(&[
            ("GEMINI_API_KEY", "secret"),
            ("GEMINI_BASE_URL", "http://localhost:9999"),
            ("LLM_TIMEOUT_SECS", "15"),
            ("LLM_MAX_ATTEMPTS", "1"),
            ("PORT", "3000"),
        ])
        .unwrap();
        assert_eq!(config.gemini_api_key.as_deref(), Some("secret"));
        assert_eq!(config.gemini_base_url, "http://localhost:9999");
        assert_eq!(config.llm_timeout_secs, 15);
        assert_eq!(config.llm_max_attempts, 1);
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        assert!(config_from(&[("PORT", "not-a-port")]).is_err());
    }

    #[test]
    fn test_zero_attempts_is_rejected() {
        assert!(config_from(&[("LLM_MAX_ATTEMPTS", "0")]).is_err());
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let err = config_from(&[("LLM_TIMEOUT_SECS", "0")])
            .err()
            .expect("zero timeout must be rejected");
        assert!(err.to_string().contains("LLM_TIMEOUT_SECS"));
    }
}
