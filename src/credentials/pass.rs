//! Password-store (pass) credential backend.
//!
//! Retrieves credentials from a pass entry. The first line of the entry is
//! the passcode; further lines hold fields in the format `field-name: value`.

use std::collections::HashMap;
use std::process::Command;

use anyhow::{Context, Result};
use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use super::{CredentialStore, PASSCODE};

/// Configuration for a pass credential store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassConfig {
    /// The pass entry path (e.g., "finance/bank").
    pub path: String,

    /// Mapping from logical key names to field names in the pass entry.
    /// If not specified, the logical key name is used as-is, except that
    /// the passcode is read from the first line.
    #[serde(default)]
    pub fields: HashMap<String, String>,
}

/// Credential store backed by password-store (pass).
pub struct PassCredentialStore {
    config: PassConfig,
}

impl PassCredentialStore {
    pub fn new(config: PassConfig) -> Self {
        Self { config }
    }

    /// Get the field name in the pass entry for a logical key.
    fn field_name<'a>(&'a self, key: &'a str) -> &'a str {
        match self.config.fields.get(key) {
            Some(field) => field.as_str(),
            None if key == PASSCODE => PassEntry::FIRST_LINE,
            None => key,
        }
    }

    fn read_entry(&self) -> Result<PassEntry> {
        let output = Command::new("pass")
            .arg("show")
            .arg(&self.config.path)
            .output()
            .context("Failed to run pass command")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("pass command failed: {}", stderr.trim());
        }

        let content = String::from_utf8(output.stdout).context("Invalid UTF-8 in pass output")?;

        Ok(PassEntry::parse(&content))
    }
}

#[async_trait]
impl CredentialStore for PassCredentialStore {
    async fn get(&self, key: &str) -> Result<Option<SecretString>> {
        let field = self.field_name(key);
        let mut entry = self.read_entry()?;

        Ok(entry.fields.remove(field).map(SecretString::from))
    }
}

/// Parsed pass entry.
#[derive(Debug, Default)]
struct PassEntry {
    fields: HashMap<String, String>,
}

impl PassEntry {
    /// Field name the first line is stored under.
    const FIRST_LINE: &'static str = "password";

    fn parse(content: &str) -> Self {
        let mut lines = content.lines();
        let mut fields = HashMap::new();

        if let Some(first) = lines.next() {
            fields.insert(Self::FIRST_LINE.to_string(), first.to_string());
        }

        for line in lines {
            if let Some((key, value)) = line.split_once(": ") {
                fields.insert(key.trim().to_string(), value.to_string());
            }
        }

        Self { fields }
    }
}
