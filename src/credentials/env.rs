//! Environment variable credential backend.

use anyhow::Result;
use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use super::CredentialStore;

fn default_prefix() -> String {
    "BANK_CRAWLER".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvConfig {
    /// Prepended to the upper-cased key, e.g. `BANK_CRAWLER_ONLINE_ID`.
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
        }
    }
}

/// Reads credentials from process environment variables.
pub struct EnvCredentialStore {
    config: EnvConfig,
    lookup: fn(&str) -> Option<String>,
}

impl EnvCredentialStore {
    pub fn new(config: EnvConfig) -> Self {
        Self::with_lookup(config, |name| std::env::var(name).ok())
    }

    fn with_lookup(config: EnvConfig, lookup: fn(&str) -> Option<String>) -> Self {
        Self { config, lookup }
    }

    pub fn variable_name(&self, key: &str) -> String {
        let key = key.to_ascii_uppercase();
        if self.config.prefix.is_empty() {
            key
        } else {
            format!("{}_{key}", self.config.prefix)
        }
    }
}

#[async_trait]
impl CredentialStore for EnvCredentialStore {
    async fn get(&self, key: &str) -> Result<Option<SecretString>> {
        Ok((self.lookup)(&self.variable_name(key))
            .filter(|value| !value.is_empty())
            .map(SecretString::from))
    }
}
