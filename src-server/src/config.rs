use std::str::FromStr;

use anyhow::{Context, Result};
use axum::http::HeaderName;
use budgetbook_core::client::DEFAULT_USER_ID_HEADER;

const DEFAULT_DATABASE_URL: &str = "budgetbook.db";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_POOL_SIZE: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub user_id_header: HeaderName,
    pub db_pool_size: u32,
    pub log_format: LogFormat,
}

impl Config {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("PORT must be a port number, got '{}'", raw))?,
            None => DEFAULT_PORT,
        };
        let db_pool_size = match get("DB_POOL_SIZE") {
            Some(raw) => raw
                .parse::<u32>()
                .with_context(|| {
                    format!("DB_POOL_SIZE must be a positive integer, got '{}'", raw)
                })?,
            None => DEFAULT_POOL_SIZE,
        };
        let header = get("USER_ID_HEADER").unwrap_or_else(|| DEFAULT_USER_ID_HEADER.to_string());
        let user_id_header = HeaderName::from_str(&header.to_lowercase())
            .with_context(|| format!("USER_ID_HEADER is not a valid header name: '{}'", header))?;
        let log_format = match get("LOG_FORMAT").as_deref() {
            Some(f) if f.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Config {
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            user_id_header,
            db_pool_size,
            log_format,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.database_url, "budgetbook.db");
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.user_id_header.as_str(), "x-user-id");
        assert_eq!(config.db_pool_size, 5);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn values_are_read_from_the_environment() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "/tmp/budgets.db"),
            ("HOST", "0.0.0.0"),
            ("PORT", "9000"),
            ("USER_ID_HEADER", "X-Remote-User"),
            ("DB_POOL_SIZE", "2"),
            ("LOG_FORMAT", "JSON"),
        ]))
        .unwrap();
        assert_eq!(config.database_url, "/tmp/budgets.db");
        assert_eq!(config.bind_address(), "0.0.0.0:9000");
        assert_eq!(config.user_id_header.as_str(), "x-remote-user");
        assert_eq!(config.db_pool_size, 2);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        assert!(Config::from_lookup(lookup(&[("PORT", "eighty")])).is_err());
        assert!(Config::from_lookup(lookup(&[("DB_POOL_SIZE", "-1")])).is_err());
        assert!(Config::from_lookup(lookup(&[("USER_ID_HEADER", "bad header")])).is_err());
    }
}
