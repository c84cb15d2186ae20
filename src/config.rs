use std::{collections::HashSet, time::Duration};

use anyhow::Context;
use url::Url;

const DEFAULT_GATEWAY_ORIGINS: &[&str] = &[
    "https://eripotter.com",
    "https://www.eripotter.com",
    "http://localhost:3000",
    "http://localhost:5173",
];

const DEFAULT_ACCOUNT_ORIGINS: &[&str] = &["https://sme.eripotter.com"];

/// Where the gateway sends `/api/{service}` traffic. `None` means the
/// service is known but its URL was not provided.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub service: String,
    pub base_url: Option<Url>,
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    pub upstream_timeout: Duration,
    pub max_body_bytes: usize,
    pub cors_origins: HashSet<String>,
    pub upstreams: Vec<UpstreamConfig>,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: String,
    pub issuer: String,
    pub ttl_minutes: i64,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone)]
pub struct AccountConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    pub cors_origins: Vec<String>,
    pub session: SessionConfig,
}

/// `.env` is only consulted outside Railway, where the platform injects
/// variables itself.
pub fn load_dotenv() {
    if !is_railway(&|k: &str| std::env::var(k).ok()) {
        dotenvy::dotenv().ok();
    }
}

fn is_railway(lookup: &impl Fn(&str) -> Option<String>) -> bool {
    lookup("RAILWAY_ENVIRONMENT").as_deref() == Some("true")
}

impl GatewayConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|k: &str| std::env::var(k).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let upstream_timeout = match lookup("UPSTREAM_TIMEOUT") {
            Some(v) => {
                let secs = v
                    .trim()
                    .parse::<f64>()
                    .with_context(|| format!("UPSTREAM_TIMEOUT is not a number: {v}"))?;
                anyhow::ensure!(secs > 0.0, "UPSTREAM_TIMEOUT must be positive");
                Duration::try_from_secs_f64(secs)
                    .with_context(|| format!("UPSTREAM_TIMEOUT out of range: {v}"))?
            }
            None => Duration::from_secs(20),
        };

        let mut upstreams = vec![
            UpstreamConfig {
                service: "account".into(),
                base_url: lookup("ACCOUNT_SERVICE_URL")
                    .map(|v| parse_upstream("ACCOUNT_SERVICE_URL", &v))
                    .transpose()?,
            },
            UpstreamConfig {
                service: "chatbot".into(),
                base_url: Some(parse_upstream(
                    "CHATBOT_SERVICE_URL",
                    &lookup("CHATBOT_SERVICE_URL")
                        .unwrap_or_else(|| "http://localhost:8003".into()),
                )?),
            },
        ];

        // GATEWAY_ROUTES="report=http://report:8000,normal=http://normal:8000"
        if let Some(extra) = lookup("GATEWAY_ROUTES") {
            for pair in extra.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                let (name, raw) = pair
                    .split_once('=')
                    .with_context(|| format!("GATEWAY_ROUTES entry must be name=url: {pair}"))?;
                let name = name.trim();
                anyhow::ensure!(!name.is_empty(), "GATEWAY_ROUTES entry has empty name: {pair}");
                let base_url = Some(parse_upstream("GATEWAY_ROUTES", raw.trim())?);
                match upstreams.iter_mut().find(|u| u.service == name) {
                    Some(existing) => existing.base_url = base_url,
                    None => upstreams.push(UpstreamConfig {
                        service: name.to_string(),
                        base_url,
                    }),
                }
            }
        }

        Ok(Self {
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&lookup, "PORT", 8080)?,
            upstream_timeout,
            max_body_bytes: parse_or(&lookup, "GATEWAY_MAX_BODY_BYTES", 10 * 1024 * 1024)?,
            cors_origins: origins(&lookup, DEFAULT_GATEWAY_ORIGINS).into_iter().collect(),
            upstreams,
        })
    }
}

impl AccountConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|k: &str| std::env::var(k).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL is not set")?;
        let cookie_secure = match lookup("COOKIE_SECURE") {
            Some(v) => v == "true" || v == "1",
            None => is_railway(&lookup),
        };
        let session = SessionConfig {
            secret: lookup("SESSION_SECRET").context("SESSION_SECRET is not set")?,
            issuer: lookup("SESSION_ISSUER").unwrap_or_else(|| "account-service".into()),
            ttl_minutes: parse_or(&lookup, "SESSION_TTL_MINUTES", 60)?,
            cookie_secure,
        };
        anyhow::ensure!(session.ttl_minutes > 0, "SESSION_TTL_MINUTES must be positive");

        Ok(Self {
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&lookup, "PORT", 8001)?,
            database_url,
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            cors_origins: origins(&lookup, DEFAULT_ACCOUNT_ORIGINS),
            session,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(v) => v
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {key}: {v}")),
        None => Ok(default),
    }
}

fn origins(lookup: &impl Fn(&str) -> Option<String>, defaults: &[&str]) -> Vec<String> {
    match lookup("CORS_ORIGINS") {
        Some(v) => v
            .split(',')
            .map(|o| o.trim().trim_end_matches('/').to_string())
            .filter(|o| !o.is_empty())
            .collect(),
        None => defaults.iter().map(|o| o.to_string()).collect(),
    }
}

fn parse_upstream(key: &str, raw: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("{key} is not a valid URL: {raw}"))?;
    anyhow::ensure!(
        matches!(url.scheme(), "http" | "https"),
        "{key} must use http or https, got {}",
        url.scheme()
    );
    Ok(url)
}
