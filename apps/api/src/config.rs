use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::retry::RetryPolicy;
use crate::llm_client::DEFAULT_API_URL;

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Optional so extraction and rendering work without upstream access.
    pub anthropic_api_key: Option<String>,
    pub anthropic_api_url: String,
    pub llm_max_retries: u32,
    pub llm_initial_delay_ms: u64,
    pub llm_max_delay_ms: u64,
    pub llm_jitter_ms: u64,
    pub llm_timeout_secs: u64,
    pub llm_attempt_timeout_secs: u64,
    /// Default for substituting placeholder entries into empty detected sections.
    pub fill_placeholder_sections: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            anthropic_api_key: None,
            anthropic_api_url: DEFAULT_API_URL.to_string(),
            llm_max_retries: 4,
            llm_initial_delay_ms: 1000,
            llm_max_delay_ms: 30_000,
            llm_jitter_ms: 250,
            llm_timeout_secs: 180,
            llm_attempt_timeout_secs: 120,
            fill_placeholder_sections: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        Ok(Config {
            port: parse_env("PORT", defaults.port)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            anthropic_api_url: std::env::var("ANTHROPIC_API_URL")
                .unwrap_or(defaults.anthropic_api_url),
            llm_max_retries: parse_env("LLM_MAX_RETRIES", defaults.llm_max_retries)?,
            llm_initial_delay_ms: parse_env("LLM_INITIAL_DELAY_MS", defaults.llm_initial_delay_ms)?,
            llm_max_delay_ms: parse_env("LLM_MAX_DELAY_MS", defaults.llm_max_delay_ms)?,
            llm_jitter_ms: parse_env("LLM_JITTER_MS", defaults.llm_jitter_ms)?,
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", defaults.llm_timeout_secs)?,
            llm_attempt_timeout_secs: parse_env(
                "LLM_ATTEMPT_TIMEOUT_SECS",
                defaults.llm_attempt_timeout_secs,
            )?,
            fill_placeholder_sections: parse_env(
                "FILL_PLACEHOLDER_SECTIONS",
                defaults.fill_placeholder_sections,
            )?,
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.llm_max_retries,
            initial_delay: Duration::from_millis(self.llm_initial_delay_ms),
            max_delay: Duration::from_millis(self.llm_max_delay_ms),
            jitter: Duration::from_millis(self.llm_jitter_ms),
            deadline: Duration::from_secs(self.llm_timeout_secs),
        }
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_attempt_timeout_secs)
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_retry_policy_matches_defaults() {
        let policy = Config::default().retry_policy();
        assert_eq!(policy.max_retries, 4);
        assert_eq!(policy.initial_delay, Duration::from_secs(1));
        assert_eq!(policy.max_delay, Duration::from_secs(30));
        assert_eq!(policy.deadline, Duration::from_secs(180));
    }

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let value: u32 = parse_env("RESUMEFORGE_TEST_UNSET_VARIABLE", 7).unwrap();
        assert_eq!(value, 7);
    }
}
