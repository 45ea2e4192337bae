use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use axum::http::HeaderValue;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_VERIFIER_URL: &str = "http://localhost:3001";
pub const DEFAULT_HISTORY_FILE: &str = "signed_messages.json";
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

fn invalid(name: &'static str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        name,
        value: value.to_string(),
    }
}

/// Settings for the HTTP verifier.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Origins allowed by CORS. Empty means any origin.
    pub allowed_origins: Vec<HeaderValue>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            allowed_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("HOST") {
            config.host = host.parse().map_err(|_| invalid("HOST", &host))?;
        }
        if let Some(port) = lookup("PORT") {
            config.port = port.parse().map_err(|_| invalid("PORT", &port))?;
        }
        if let Some(origins) = lookup("CORS_ALLOWED_ORIGINS") {
            config.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(|origin| {
                    origin
                        .parse::<HeaderValue>()
                        .map_err(|_| invalid("CORS_ALLOWED_ORIGINS", origin))
                })
                .collect::<Result<_, _>>()?;
        }

        Ok(config)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Settings for the `holder` client.
#[derive(Debug, Clone)]
pub struct HolderConfig {
    pub verifier_url: String,
    pub history_file: PathBuf,
    pub history_limit: usize,
}

impl HolderConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let verifier_url = lookup("VERIFIER_URL")
            .unwrap_or_else(|| DEFAULT_VERIFIER_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let history_file = lookup("HISTORY_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_HISTORY_FILE));
        let history_limit = match lookup("HISTORY_LIMIT") {
            Some(limit) => match limit.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => return Err(invalid("HISTORY_LIMIT", &limit)),
            },
            None => DEFAULT_HISTORY_LIMIT,
        };

        Ok(Self {
            verifier_url,
            history_file,
            history_limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn server_defaults() {
        let config = ServerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:3001");
        assert!(config.allowed_origins.is_empty());
    }

    #[test]
    fn server_overrides() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            (
                "CORS_ALLOWED_ORIGINS",
                "http://localhost:5173, https://example.org,",
            ),
        ]))
        .unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8080");
        assert_eq!(config.allowed_origins.len(), 2);
        assert_eq!(config.allowed_origins[1], "https://example.org");
    }

    #[test]
    fn server_rejects_bad_port() {
        assert_matches!(
            ServerConfig::from_lookup(lookup_from(&[("PORT", "http")])),
            Err(ConfigError::Invalid { name: "PORT", .. })
        );
    }

    #[test]
    fn holder_settings() {
        let config = HolderConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.verifier_url, DEFAULT_VERIFIER_URL);
        assert_eq!(config.history_limit, DEFAULT_HISTORY_LIMIT);

        let config = HolderConfig::from_lookup(lookup_from(&[
            ("VERIFIER_URL", "https://verifier.example/"),
            ("HISTORY_LIMIT", "5"),
        ]))
        .unwrap();
        assert_eq!(config.verifier_url, "https://verifier.example");
        assert_eq!(config.history_limit, 5);

        assert_matches!(
            HolderConfig::from_lookup(lookup_from(&[("HISTORY_LIMIT", "0")])),
            Err(ConfigError::Invalid { .. })
        );
    }
}
