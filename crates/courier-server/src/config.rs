use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Duration;
use tracing::warn;

use courier_db::DbConfig;

/// Placeholder secrets that are accepted for local development only.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub db: DbConfig,
}

impl ServerConfig {
    /// Read settings from the process environment (after `.env` is loaded).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = get("COURIER_JWT_SECRET").unwrap_or_else(|| "dev-secret-change-me".into());
        if jwt_secret.is_empty() {
            anyhow::bail!("COURIER_JWT_SECRET must not be empty");
        }
        if PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            warn!("COURIER_JWT_SECRET is a placeholder; set a real secret before deploying");
        }

        let port: u16 = get("COURIER_PORT")
            .unwrap_or_else(|| "8011".into())
            .parse()
            .context("COURIER_PORT must be a port number")?;
        let ttl_secs: i64 = get("COURIER_TOKEN_TTL_SECS")
            .unwrap_or_else(|| "3600".into())
            .parse()
            .context("COURIER_TOKEN_TTL_SECS must be an integer")?;
        if ttl_secs <= 0 {
            anyhow::bail!("COURIER_TOKEN_TTL_SECS must be positive");
        }
        let reader_pool_size: usize = get("COURIER_DB_READERS")
            .unwrap_or_else(|| "4".into())
            .parse()
            .context("COURIER_DB_READERS must be an integer")?;

        Ok(Self {
            host: get("COURIER_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            jwt_secret,
            token_ttl: Duration::seconds(ttl_secs),
            db: DbConfig {
                path: PathBuf::from(get("COURIER_DB_PATH").unwrap_or_else(|| "courier.db".into())),
                reader_pool_size,
            },
        })
    }
}
