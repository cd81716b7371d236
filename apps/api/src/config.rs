use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// HMAC secret for sharing tokens.
    pub token_secret: String,
    pub identity_provider_url: String,
    pub identity_provider_key: String,
    /// Prefix for share links; empty means links are returned relative.
    pub public_base_url: String,
    pub share_token_ttl_hours: i64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let token_secret = require_env("TOKEN_SECRET")?;
        if token_secret.len() < 32 {
            anyhow::bail!("TOKEN_SECRET must be at least 32 bytes");
        }

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            token_secret,
            identity_provider_url: require_env("IDENTITY_PROVIDER_URL")?
                .trim_end_matches('/')
                .to_string(),
            identity_provider_key: require_env("IDENTITY_PROVIDER_KEY")?,
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_default()
                .trim_end_matches('/')
                .to_string(),
            share_token_ttl_hours: std::env::var("SHARE_TOKEN_TTL_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse::<i64>()
                .context("SHARE_TOKEN_TTL_HOURS must be a whole number of hours")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
