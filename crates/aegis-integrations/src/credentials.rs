//! Credential resolution
//!
//! Integration settings name their credential variables; the values come
//! from a [`CredentialSource`] handed to the gateway. Values are wrapped in
//! [`Zeroizing`] so they are wiped on drop, and they are never logged.
//!
//! # Example
//!
//! ```rust,ignore
//! use aegis_integrations::credentials::{CredentialChain, DotEnvCredentials, EnvCredentials};
//!
//! // Process environment wins over the .env file
//! let chain = CredentialChain::new()
//!     .with_source(EnvCredentials::new())
//!     .with_source(DotEnvCredentials::from_file(".env")?);
//! let user = chain.lookup("SERVICENOW_USERNAME").await;
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use zeroize::Zeroizing;

/// A secret value
pub type Secret = Zeroizing<String>;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("credentials file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A lookup table from variable name to secret
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// Source name, for logs
    fn name(&self) -> &str;

    /// The value of a variable; unset and empty both resolve to `None`
    async fn lookup(&self, variable: &str) -> Option<Secret>;
}

/// Reads the process environment at lookup time
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvCredentials;

impl EnvCredentials {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CredentialSource for EnvCredentials {
    fn name(&self) -> &str {
        "env"
    }

    async fn lookup(&self, variable: &str) -> Option<Secret> {
        std::env::var(variable)
            .ok()
            .filter(|value| !value.is_empty())
            .map(Zeroizing::new)
    }
}

/// In-memory variable table
#[derive(Default)]
pub struct CredentialTable {
    values: HashMap<String, Secret>,
}

impl CredentialTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable (builder pattern)
    pub fn with(mut self, variable: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(variable, value);
        self
    }

    pub fn insert(&mut self, variable: impl Into<String>, value: impl Into<String>) {
        self.values
            .insert(variable.into(), Zeroizing::new(value.into()));
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl std::fmt::Debug for CredentialTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.values.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("CredentialTable")
            .field("variables", &names)
            .finish()
    }
}

#[async_trait]
impl CredentialSource for CredentialTable {
    fn name(&self) -> &str {
        "table"
    }

    async fn lookup(&self, variable: &str) -> Option<Secret> {
        self.values
            .get(variable)
            .filter(|value| !value.is_empty())
            .cloned()
    }
}

/// Variables from a `.env` file, parsed once at construction
///
/// ```text
/// # Comment
/// SERVICENOW_USERNAME=svc_dashboard
/// SERVICENOW_PASSWORD="p@ss word"
/// export SOLARWINDS_USERNAME=orion
/// ```
pub struct DotEnvCredentials {
    path: PathBuf,
    table: CredentialTable,
}

impl DotEnvCredentials {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CredentialError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(CredentialError::FileNotFound(path));
        }
        let content = Zeroizing::new(std::fs::read_to_string(&path)?);
        let table = parse_dotenv(&content);
        tracing::info!(path = %path.display(), variables = table.len(), "Loaded credentials file");
        Ok(Self { path, table })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for DotEnvCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DotEnvCredentials")
            .field("path", &self.path)
            .field("table", &self.table)
            .finish()
    }
}

#[async_trait]
impl CredentialSource for DotEnvCredentials {
    fn name(&self) -> &str {
        "dotenv"
    }

    async fn lookup(&self, variable: &str) -> Option<Secret> {
        self.table.lookup(variable).await
    }
}

fn parse_dotenv(content: &str) -> CredentialTable {
    let mut table = CredentialTable::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim();
        let unquoted = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
            .unwrap_or(value);
        let unescaped = unquoted
            .replace("\\n", "\n")
            .replace("\\t", "\t")
            .replace("\\r", "\r");
        table.insert(key.trim(), unescaped);
    }
    table
}

/// Sources tried in order; the first holding a non-empty value wins
#[derive(Default, Clone)]
pub struct CredentialChain {
    sources: Vec<Arc<dyn CredentialSource>>,
}

impl std::fmt::Debug for CredentialChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialChain")
            .field("sources", &self.source_names())
            .finish()
    }
}

impl CredentialChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source (builder pattern); earlier sources take priority
    pub fn with_source<S: CredentialSource + 'static>(mut self, source: S) -> Self {
        self.sources.push(Arc::new(source));
        self
    }

    pub fn add_arc_source(&mut self, source: Arc<dyn CredentialSource>) {
        self.sources.push(source);
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[async_trait]
impl CredentialSource for CredentialChain {
    fn name(&self) -> &str {
        "chain"
    }

    async fn lookup(&self, variable: &str) -> Option<Secret> {
        for source in &self.sources {
            if let Some(value) = source.lookup(variable).await {
                tracing::debug!(variable, source = source.name(), "Resolved credential");
                return Some(value);
            }
        }
        None
    }
}
