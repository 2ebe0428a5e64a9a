//! Configuração via variáveis de ambiente (`.env` é carregado antes)

use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

pub const ADDR_VAR: &str = "SICKGENES_ADDR";
pub const SNAPSHOT_VAR: &str = "SICKGENES_SNAPSHOT";
const DEFAULT_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid {var} '{value}': {source}")]
    InvalidAddr {
        var: &'static str,
        value: String,
        source: AddrParseError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub addr: SocketAddr,
    /// Snapshot JSON; ausente usa os dados de demonstração
    pub snapshot: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = get(ADDR_VAR)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = value.trim().parse().map_err(|source| ConfigError::InvalidAddr {
            var: ADDR_VAR,
            value: value.clone(),
            source,
        })?;

        let snapshot = get(SNAPSHOT_VAR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self { addr, snapshot })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.addr, "0.0.0.0:3000".parse::<SocketAddr>().unwrap());
        assert!(config.snapshot.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[(ADDR_VAR, "127.0.0.1:8080"), (SNAPSHOT_VAR, "data/snapshot.json")]).unwrap();
        assert_eq!(config.addr.port(), 8080);
        assert_eq!(config.snapshot, Some(PathBuf::from("data/snapshot.json")));
    }

    #[test]
    fn test_invalid_addr() {
        let err = config(&[(ADDR_VAR, "localhost")]).unwrap_err();
        assert!(err.to_string().contains("SICKGENES_ADDR"));
    }
}
