//! Server settings
//!
//! Loaded from a JSON, YAML or TOML file chosen by extension. Every field
//! has a default, so an empty file (or none at all) is a valid setup.
//! Integration settings are not here: they live in the store and are edited
//! through the API.

use aegis_integrations::credentials::{CredentialChain, CredentialError, DotEnvCredentials, EnvCredentials};
use aegis_integrations::HttpSettings;
use aegis_storage::{EntityStore, MemoryBackend, SledBackend, StoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unsupported settings format: {0}. Supported formats: json, yaml, yml, toml")]
    UnsupportedFormat(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub http: HttpClientSettings,
    pub credentials: CredentialSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Memory,
    Sled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: StorageKind,
    pub path: PathBuf,
    pub flush_on_write: bool,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageKind::Memory,
            path: PathBuf::from("./data/aegis"),
            flush_on_write: true,
        }
    }
}

impl StorageSettings {
    pub fn open_store(&self) -> StoreResult<EntityStore> {
        match self.backend {
            StorageKind::Memory => Ok(EntityStore::new(MemoryBackend::new())),
            StorageKind::Sled => {
                let backend = SledBackend::open(&self.path)?.with_flush_on_write(self.flush_on_write);
                tracing::info!(path = %self.path.display(), "Opened sled store");
                Ok(EntityStore::new(backend))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientSettings {
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl Default for HttpClientSettings {
    fn default() -> Self {
        let defaults = HttpSettings::default();
        Self {
            timeout_ms: u64::try_from(defaults.timeout.as_millis()).unwrap_or(u64::MAX),
            user_agent: defaults.user_agent,
        }
    }
}

impl HttpClientSettings {
    pub fn to_http_settings(&self) -> HttpSettings {
        HttpSettings {
            timeout: Duration::from_millis(self.timeout_ms),
            user_agent: self.user_agent.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialSettings {
    /// `.env`-format file consulted after the process environment
    pub dotenv: Option<PathBuf>,
}

impl CredentialSettings {
    /// Process environment first, then the dotenv file if configured
    pub fn credential_chain(&self) -> Result<CredentialChain, CredentialError> {
        let chain = CredentialChain::new().with_source(EnvCredentials::new());
        match &self.dotenv {
            Some(path) => Ok(chain.with_source(DotEnvCredentials::from_file(path)?)),
            None => Ok(chain),
        }
    }
}

impl Settings {
    /// Load settings from a file, picking the parser by extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        Self::parse(&content, &extension)
    }

    pub fn parse(content: &str, format: &str) -> Result<Self, ConfigError> {
        match format {
            "json" => Ok(serde_json::from_str(content)?),
            "yaml" | "yml" => Ok(serde_yaml::from_str(content)?),
            "toml" => Ok(toml::from_str(content)?),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.storage.backend, StorageKind::Memory);
        assert_eq!(settings.http.user_agent, "AegisDashboard/1.0");
        assert_eq!(settings.http.timeout_ms, 10_000);
    }

    #[test]
    fn test_partial_yaml() {
        let settings = Settings::parse("server:\n  port: 9000\nstorage:\n  backend: sled\n", "yaml").unwrap();
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.storage.backend, StorageKind::Sled);
    }

    #[test]
    fn test_toml_and_json() {
        let settings = Settings::parse("[http]\ntimeout_ms = 2500\n", "toml").unwrap();
        assert_eq!(settings.http.to_http_settings().timeout, Duration::from_millis(2500));

        let settings = Settings::parse(r#"{"credentials": {"dotenv": ".env"}}"#, "json").unwrap();
        assert_eq!(settings.credentials.dotenv, Some(PathBuf::from(".env")));
    }

    #[test]
    fn test_unsupported_format() {
        assert!(matches!(
            Settings::parse("", "ini"),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aegis.json");
        std::fs::write(&path, r#"{"server": {"port": 7000}}"#).unwrap();
        assert_eq!(Settings::from_file(&path).unwrap().server.port, 7000);
    }
}
