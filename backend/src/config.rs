use std::env;
use std::net::SocketAddr;
use std::time::Duration;

const DEFAULT_YAHOO_API_URL: &str = "https://query1.finance.yahoo.com";
const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Server settings read from the environment (`.env` is loaded first by `main`).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub site_root: String,
    pub yahoo_api_url: String,
    pub history_range: String,
    pub openai_api_key: Option<String>,
    pub openai_api_url: String,
    pub openai_model: String,
    pub upstream_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            site_root: "site".to_string(),
            yahoo_api_url: DEFAULT_YAHOO_API_URL.to_string(),
            history_range: "3mo".to_string(),
            openai_api_key: None,
            openai_api_url: DEFAULT_OPENAI_API_URL.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            upstream_timeout: Duration::from_secs(60),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let host = get("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = get("PORT").unwrap_or_else(|| "8080".to_string());
        let addr_raw = format!("{host}:{port}");
        let addr = addr_raw.parse().map_err(|_| ConfigError::Invalid {
            key: "HOST/PORT",
            value: addr_raw.clone(),
        })?;

        let upstream_timeout = match get("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::Invalid {
                    key: "UPSTREAM_TIMEOUT_SECS",
                    value: raw,
                })?,
            None => defaults.upstream_timeout,
        };

        Ok(Self {
            addr,
            site_root: get("SITE_ROOT").unwrap_or(defaults.site_root),
            yahoo_api_url: get("YAHOO_API_URL").unwrap_or(defaults.yahoo_api_url),
            history_range: get("HISTORY_RANGE").unwrap_or(defaults.history_range),
            openai_api_key: get("OPENAI_API_KEY"),
            openai_api_url: get("OPENAI_API_URL").unwrap_or(defaults.openai_api_url),
            openai_model: get("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            upstream_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let cfg = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.addr.to_string(), "0.0.0.0:8080");
        assert_eq!(cfg.site_root, "site");
        assert_eq!(cfg.history_range, "3mo");
        assert_eq!(cfg.openai_model, "gpt-4o");
        assert!(cfg.openai_api_key.is_none());
        assert_eq!(cfg.upstream_timeout, Duration::from_secs(60));
    }

    #[test]
    fn overrides_and_blank_key() {
        let cfg = ServerConfig::from_lookup(lookup(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "3000"),
            ("OPENAI_API_KEY", "   "),
            ("UPSTREAM_TIMEOUT_SECS", "5"),
            ("YAHOO_API_URL", "http://localhost:9000"),
        ]))
        .unwrap();
        assert_eq!(cfg.addr.to_string(), "127.0.0.1:3000");
        assert!(cfg.openai_api_key.is_none());
        assert_eq!(cfg.upstream_timeout, Duration::from_secs(5));
        assert_eq!(cfg.yahoo_api_url, "http://localhost:9000");
    }

    #[test]
    fn rejects_bad_port() {
        let err = ServerConfig::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("HOST/PORT"));
    }
}
