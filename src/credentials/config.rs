//! Credential backend selection.

use serde::{Deserialize, Serialize};

use super::env::{EnvConfig, EnvCredentialStore};
use super::pass::{PassConfig, PassCredentialStore};
use super::CredentialStore;

/// Configuration for a credential store, the `[credentials]` table of the
/// crawler config.
///
/// # Example
///
/// ```toml
/// backend = "pass"
/// path = "finance/bank"
///
/// [fields]
/// online_id = "login"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum CredentialConfig {
    /// Password-store (pass) backend.
    Pass {
        #[serde(flatten)]
        config: PassConfig,
    },
    /// Environment variables.
    Env {
        #[serde(flatten)]
        config: EnvConfig,
    },
}

impl Default for CredentialConfig {
    fn default() -> Self {
        CredentialConfig::Env {
            config: EnvConfig::default(),
        }
    }
}

impl CredentialConfig {
    /// Build a credential store from this configuration.
    pub fn build(&self) -> Box<dyn CredentialStore> {
        match self {
            CredentialConfig::Pass { config } => Box::new(PassCredentialStore::new(config.clone())),
            CredentialConfig::Env { config } => Box::new(EnvCredentialStore::new(config.clone())),
        }
    }
}
