use anyhow::{Context, Result};

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_PORT: u16 = 3000;

/// Bridge configuration loaded once at startup from environment variables.
/// Startup fails if a required variable is missing; nothing re-reads the
/// environment afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    /// ServiceNow instance base URL, e.g. `https://acme.service-now.com`.
    pub sn_instance: String,
    pub sn_username: String,
    pub sn_password: String,
    pub openai_api_key: String,
    pub openai_model: String,
    /// Base URL of an OpenAI-compatible API (the `/chat/completions` path is appended).
    pub openai_base_url: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| -> Result<String> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .with_context(|| format!("Required environment variable '{key}' is not set"))
        };
        let optional = |key: &str, default: &str| -> String {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let port = match lookup("PORT") {
            Some(raw) if !raw.trim().is_empty() => raw
                .trim()
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            _ => DEFAULT_PORT,
        };

        Ok(Config {
            sn_instance: trim_base_url(require("SN_INSTANCE")?),
            sn_username: require("SN_USERNAME")?,
            sn_password: require("SN_PASSWORD")?,
            openai_api_key: require("OPENAI_API_KEY")?,
            openai_model: optional("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
            openai_base_url: trim_base_url(optional("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL)),
            port,
            rust_log: optional("RUST_LOG", "info"),
        })
    }
}

fn trim_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
