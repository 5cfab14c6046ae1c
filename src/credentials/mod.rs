//! Credential lookup for the external services.
//!
//! Sources are consulted in order until one yields a non-empty value.
//! The default chain checks the process environment first, then the secrets file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::Config;

/// A place credentials can be read from
pub trait CredentialProvider: Send + Sync {
    /// Look up a credential by name
    fn resolve(&self, name: &str) -> Option<String>;

    /// Short label used in log and error messages
    fn describe(&self) -> String;
}

/// Reads credentials from environment variables
#[derive(Debug, Default, Clone)]
pub struct EnvSource;

impl CredentialProvider for EnvSource {
    fn resolve(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().and_then(non_empty)
    }

    fn describe(&self) -> String {
        "environment".to_string()
    }
}

/// Reads credentials from a flat YAML map of names to values
#[derive(Debug, Clone)]
pub struct SecretsFileSource {
    path: PathBuf,
}

impl SecretsFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_secrets(&self) -> Option<HashMap<String, String>> {
        // A missing secrets file is normal; only malformed content is worth a warning
        let content = fs_err::read_to_string(&self.path).ok()?;

        match serde_yaml::from_str::<HashMap<String, String>>(&content) {
            Ok(secrets) => Some(secrets),
            Err(e) => {
                tracing::warn!("Ignoring malformed secrets file {}: {}", self.path.display(), e);
                None
            }
        }
    }
}

impl CredentialProvider for SecretsFileSource {
    fn resolve(&self, name: &str) -> Option<String> {
        self.read_secrets()?.remove(name).and_then(non_empty)
    }

    fn describe(&self) -> String {
        format!("secrets file {}", self.path.display())
    }
}

/// Ordered list of credential sources
#[derive(Default)]
pub struct CredentialChain {
    sources: Vec<Box<dyn CredentialProvider>>,
}

impl CredentialChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Environment first, then the configured secrets file
    pub fn from_config(config: &Config) -> Self {
        let mut chain = Self::new().with_source(EnvSource);
        if let Some(path) = config.secrets_path() {
            chain = chain.with_source(SecretsFileSource::new(path));
        }
        chain
    }

    pub fn with_source(mut self, source: impl CredentialProvider + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl CredentialProvider for CredentialChain {
    fn resolve(&self, name: &str) -> Option<String> {
        self.sources.iter().find_map(|source| {
            let value = source.resolve(name)?;
            tracing::debug!("Resolved credential {} from {}", name, source.describe());
            Some(value)
        })
    }

    fn describe(&self) -> String {
        let sources: Vec<String> = self.sources.iter().map(|s| s.describe()).collect();
        sources.join(", ")
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
