use std::{env, fmt::Display, str::FromStr};

use anyhow::{Context, Result, anyhow};
use dotenvy::dotenv;
use tracing::Level;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub server_addr: String,
    pub access_token_ttl: usize,
    pub refresh_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_register_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
    /// Browser origins allowed by CORS, e.g. `http://localhost:3000`.
    pub cors_origins: Vec<String>,

    pub log_dir: String,
    pub log_level: Level,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            server_addr: required(&lookup, "SERVER_ADDR")?,
            database_url: required(&lookup, "DATABASE_URL")?,
            jwt_secret: required(&lookup, "JWT_SECRET")?,
            db_max_connections: parsed(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            access_token_ttl: parsed(&lookup, "ACCESS_TOKEN_TTL", 900)?, // 15 min
            refresh_token_ttl: parsed(&lookup, "REFRESH_TOKEN_TTL", 604_800)?, // 7 days

            rate_login_per_min: parsed(&lookup, "RATE_LOGIN_PER_MIN", 60)?,
            rate_register_per_min: parsed(&lookup, "RATE_REGISTER_PER_MIN", 30)?,
            rate_protected_per_min: parsed(&lookup, "RATE_PROTECTED_PER_MIN", 1000)?,

            api_prefix: lookup("API_PREFIX").unwrap_or_else(|| "/api".to_string()),
            cors_origins: origins(&lookup, "CORS_ORIGIN", "http://localhost:3000")?,

            log_dir: lookup("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
            log_level: parsed(&lookup, "LOG_LEVEL", Level::INFO)?,
        })
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).with_context(|| format!("{key} must be set"))
}

fn parsed<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e| anyhow!("{key} has invalid value {value:?}: {e}")),
        None => Ok(default),
    }
}

/// Comma separated origins; each must be an explicit http(s) origin.
fn origins<F>(lookup: &F, key: &str, default: &str) -> Result<Vec<String>>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(key).unwrap_or_else(|| default.to_string());
    let origins: Vec<String> = value
        .split(',')
        .map(|origin| origin.trim().trim_end_matches('/').to_string())
        .filter(|origin| !origin.is_empty())
        .collect();

    if origins.is_empty() {
        return Err(anyhow!("{key} must list at least one origin"));
    }
    if let Some(bad) = origins
        .iter()
        .find(|o| !(o.starts_with("http://") || o.starts_with("https://")))
    {
        return Err(anyhow!("{key} has invalid origin {bad:?}"));
    }
    Ok(origins)
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("SERVER_ADDR", "127.0.0.1:5000"),
        ("DATABASE_URL", "mysql://localhost/payroll"),
        ("JWT_SECRET", "secret"),
    ];

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&REQUIRED)).unwrap();
        assert_eq!(config.access_token_ttl, 900);
        assert_eq!(config.refresh_token_ttl, 604_800);
        assert_eq!(config.rate_register_per_min, 30);
        assert_eq!(config.api_prefix, "/api");
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.db_max_connections, 10);
        assert_eq!(config.cors_origins, vec!["http://localhost:3000"]);
    }

    #[test]
    fn test_cors_origins() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("CORS_ORIGIN", "https://payroll.example.com/, http://localhost:5173"));
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(
            config.cors_origins,
            vec!["https://payroll.example.com", "http://localhost:5173"]
        );
    }

    #[test]
    fn test_wildcard_origin_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("CORS_ORIGIN", "*"));
        let err = Config::from_lookup(lookup_from(&pairs)).err().unwrap();
        assert!(err.to_string().contains("CORS_ORIGIN"));
    }

    #[test]
    fn test_missing_required_value() {
        let err = Config::from_lookup(lookup_from(&REQUIRED[..2])).err().unwrap();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn test_overrides() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("LOG_LEVEL", "debug"));
        pairs.push(("ACCESS_TOKEN_TTL", "60"));
        pairs.push(("API_PREFIX", "/v2"));
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.access_token_ttl, 60);
        assert_eq!(config.api_prefix, "/v2");
    }

    #[test]
    fn test_invalid_number() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("RATE_LOGIN_PER_MIN", "lots"));
        let err = Config::from_lookup(lookup_from(&pairs)).err().unwrap();
        assert!(err.to_string().contains("RATE_LOGIN_PER_MIN"));
    }
}
