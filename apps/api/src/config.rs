use anyhow::{Context, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";
pub const DEFAULT_MODEL: &str = "deepseek-chat";

/// Settings for the chat-completion provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// `None` when `DEEPSEEK_API_KEY` is unset or blank.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    /// Transport timeout. `None` leaves reqwest's default (no timeout).
    pub timeout_secs: Option<u64>,
}

/// Application configuration, read once at startup and handed to the wiring code.
#[derive(Debug, Clone)]
pub struct Config {
    pub provider: ProviderConfig,
    pub use_mock_api: bool,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let timeout_secs = optional("LLM_TIMEOUT_SECS")
            .map(|v| {
                v.trim()
                    .parse::<u64>()
                    .context("LLM_TIMEOUT_SECS must be a whole number of seconds")
            })
            .transpose()?;

        Ok(Config {
            provider: ProviderConfig {
                api_key: optional("DEEPSEEK_API_KEY"),
                base_url: optional("DEEPSEEK_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                model: optional("DEEPSEEK_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                timeout_secs,
            },
            use_mock_api: is_truthy(optional("USE_MOCK_API").as_deref()),
            port: optional("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .trim()
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

/// Only the literal `true`, in any case, turns a flag on.
fn is_truthy(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}
