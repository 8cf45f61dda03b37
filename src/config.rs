use anyhow::Context;
use axum_extra::extract::cookie::SameSite;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Attributes applied to the `token` session cookie.
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub secure: bool,
    pub same_site: SameSite,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub cookie: CookieConfig,
    pub cors_origins: Vec<String>,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "user-management".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "user-management-clients".into()),
            ttl_minutes: parse_ttl_minutes(std::env::var("JWT_TTL_MINUTES").ok().as_deref())?,
        };
        let cookie = CookieConfig {
            secure: std::env::var("COOKIE_SECURE")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
            same_site: std::env::var("COOKIE_SAME_SITE")
                .ok()
                .map(|v| parse_same_site(&v))
                .transpose()?
                .unwrap_or(SameSite::Strict),
        };
        let cors_origins = std::env::var("CORS_ORIGINS")
            .map(|v| split_origins(&v))
            .unwrap_or_else(|_| vec!["http://localhost:5173".to_string()]);
        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = std::env::var("APP_PORT")
            .or_else(|_| std::env::var("PORT"))
            .unwrap_or_else(|_| "8080".into())
            .parse::<u16>()
            .context("APP_PORT must be a valid port number")?;

        Ok(Self {
            database_url,
            jwt,
            cookie,
            cors_origins,
            host,
            port,
        })
    }
}

pub const DEFAULT_TTL_MINUTES: i64 = 60 * 24 * 7;
/// One year.
pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 366;

/// Unset or unparseable values fall back to seven days; oversized ones fail startup.
fn parse_ttl_minutes(value: Option<&str>) -> anyhow::Result<i64> {
    let Some(minutes) = value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| *v > 0)
    else {
        return Ok(DEFAULT_TTL_MINUTES);
    };
    if minutes > MAX_TTL_MINUTES {
        anyhow::bail!("JWT_TTL_MINUTES must be at most {MAX_TTL_MINUTES}, got {minutes}");
    }
    Ok(minutes)
}

fn parse_same_site(value: &str) -> anyhow::Result<SameSite> {
    match value.trim().to_ascii_lowercase().as_str() {
        "strict" => Ok(SameSite::Strict),
        "lax" => Ok(SameSite::Lax),
        "none" => Ok(SameSite::None),
        other => anyhow::bail!("unsupported COOKIE_SAME_SITE value: {other}"),
    }
}

fn split_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
