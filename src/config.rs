use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_TTL_MINUTES: i64 = 60;
/// One week.
pub const MAX_TTL_MINUTES: i64 = 7 * 24 * 60;

pub const DEFAULT_AVATAR_URL: &str =
    "https://i1.sndcdn.com/artworks-g7kIKaunKMhFmEzL-qvSs4g-t500x500.jpg";

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// When unset the service runs against the in-memory store.
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    pub default_avatar_url: String,
    pub secure_cookies: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());

        let secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        anyhow::ensure!(!secret.trim().is_empty(), "JWT_SECRET must not be empty");

        let jwt = JwtConfig {
            secret,
            ttl_minutes: parse_ttl_minutes(std::env::var("JWT_TTL_MINUTES").ok().as_deref())?,
        };

        let default_avatar_url =
            std::env::var("DEFAULT_AVATAR_URL").unwrap_or_else(|_| DEFAULT_AVATAR_URL.into());
        let secure_cookies = std::env::var("APP_ENV")
            .map(|v| v == "production")
            .unwrap_or(false);

        Ok(Self {
            database_url,
            jwt,
            default_avatar_url,
            secure_cookies,
        })
    }

    /// Session cookie lifetime, kept equal to the token TTL.
    pub fn session_max_age(&self) -> time::Duration {
        time::Duration::seconds(self.jwt.ttl_minutes.saturating_mul(60))
    }
}

/// Unset or blank falls back to the default; anything else must be a whole number
/// of minutes within `1..=MAX_TTL_MINUTES`.
fn parse_ttl_minutes(raw: Option<&str>) -> anyhow::Result<i64> {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(DEFAULT_TTL_MINUTES);
    };
    let minutes: i64 = raw
        .parse()
        .with_context(|| format!("JWT_TTL_MINUTES must be a number, got {raw:?}"))?;
    anyhow::ensure!(
        (1..=MAX_TTL_MINUTES).contains(&minutes),
        "JWT_TTL_MINUTES must be between 1 and {MAX_TTL_MINUTES}, got {minutes}"
    );
    Ok(minutes)
}
