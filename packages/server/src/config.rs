use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Default dispatch site endpoint (form POST target).
pub const DEFAULT_CRAWLER_URL: &str =
    "http://logistics.ds3211.co.kr/daesin/servlet/total.TotServlet";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    /// Optional shared secret for the manual sync endpoint. When unset the
    /// endpoint is open (development).
    pub api_key: Option<String>,
    pub crawler_base_url: String,
    /// Courtesy delay between migrated days, in milliseconds.
    pub migration_day_delay_ms: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set, using development default");
            "dev-secret-change-in-production".to_string()
        });

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            jwt_secret,
            api_key: env::var("API_KEY").ok(),
            crawler_base_url: env::var("CRAWLER_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_CRAWLER_URL.to_string()),
            migration_day_delay_ms: env::var("MIGRATION_DAY_DELAY_MS")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .context("MIGRATION_DAY_DELAY_MS must be a valid number")?,
        })
    }
}
