use crate::error::IngestError;

pub const DEFAULT_GRPC_PORT: u16 = 50051;
pub const DEFAULT_DATABASE_URL: &str = "ingest.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub grpc_port: u16,
    /// Path of the SQLite database file.
    pub database_url: String,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, IngestError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, IngestError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let grpc_port = match lookup("GRPC_PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| IngestError::Config {
                message: format!("Invalid GRPC_PORT: {}", raw),
            })?,
            None => DEFAULT_GRPC_PORT,
        };

        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        Ok(Self {
            grpc_port,
            database_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = ServiceConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.grpc_port, DEFAULT_GRPC_PORT);
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
    }

    #[test]
    fn reads_values_from_environment() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            ("GRPC_PORT", "6000"),
            ("DATABASE_URL", "/var/lib/ingest/data.db"),
        ]))
        .unwrap();
        assert_eq!(config.grpc_port, 6000);
        assert_eq!(config.database_url, "/var/lib/ingest/data.db");
    }

    #[test]
    fn invalid_port_is_a_config_error() {
        let err = ServiceConfig::from_lookup(lookup_from(&[("GRPC_PORT", "not-a-port")]))
            .unwrap_err();
        assert!(matches!(err, IngestError::Config { .. }));
    }
}
