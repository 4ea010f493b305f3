use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::credentials::CredentialConfig;
use crate::crawler::CrawlOptions;
use crate::duration::{deserialize_duration, serialize_duration};
use crate::parser::DEFAULT_SECURE_BASE_URL;
use crate::signin::{SignInPage, DEFAULT_SIGN_IN_URL};
use crate::wait::{DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT};

fn default_sign_in_url() -> String {
    DEFAULT_SIGN_IN_URL.to_string()
}

fn default_secure_base_url() -> String {
    DEFAULT_SECURE_BASE_URL.to_string()
}

fn default_wait_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn default_poll_interval() -> Duration {
    DEFAULT_POLL_INTERVAL
}

fn default_page_load_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Condition wait settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitConfig {
    /// How long a single wait may take before giving up.
    #[serde(
        default = "default_wait_timeout",
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub timeout: Duration,

    /// Delay between two checks of a condition.
    #[serde(
        default = "default_poll_interval",
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub poll_interval: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout: default_wait_timeout(),
            poll_interval: default_poll_interval(),
        }
    }
}

/// How the browser is launched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserOptions {
    /// Run without a visible window.
    pub headless: bool,

    /// Skip image downloads to speed up page loads.
    pub disable_images: bool,

    /// Explicit Chrome/Chromium executable. Looked up on the system if unset.
    pub chrome_path: Option<PathBuf>,

    /// Browser profile directory. A throwaway profile is used if unset.
    pub profile_dir: Option<PathBuf>,

    /// How long a page load may take before it counts as timed out.
    #[serde(
        default = "default_page_load_timeout",
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub page_load_timeout: Duration,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: false,
            disable_images: false,
            chrome_path: None,
            profile_dir: None,
            page_load_timeout: default_page_load_timeout(),
        }
    }
}

/// Crawler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Page holding the sign-in form.
    #[serde(default = "default_sign_in_url")]
    pub sign_in_url: String,

    /// Base for resolving account detail links.
    #[serde(default = "default_secure_base_url")]
    pub secure_base_url: String,

    /// Display names of the accounts to fetch, exactly as the portal shows them.
    pub accounts: Vec<String>,

    #[serde(default)]
    pub wait: WaitConfig,

    #[serde(default)]
    pub browser: BrowserOptions,

    /// Where the online id and passcode come from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<CredentialConfig>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            sign_in_url: default_sign_in_url(),
            secure_base_url: default_secure_base_url(),
            accounts: Vec::new(),
            wait: WaitConfig::default(),
            browser: BrowserOptions::default(),
            credentials: None,
        }
    }
}

impl CrawlerConfig {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: CrawlerConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load config from a file, or return default config if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// The requested account names as a lookup set.
    pub fn wanted_accounts(&self) -> HashSet<String> {
        self.accounts.iter().cloned().collect()
    }

    pub fn crawl_options(&self) -> CrawlOptions {
        CrawlOptions {
            sign_in: SignInPage {
                url: self.sign_in_url.clone(),
                ..SignInPage::default()
            },
            secure_base_url: self.secure_base_url.clone(),
            wait_timeout: self.wait.timeout,
            poll_interval: self.wait.poll_interval,
        }
    }
}

/// Returns the default config file path.
///
/// Resolution order:
/// 1. `./bank-crawler.toml` if it exists in current directory
/// 2. `~/.config/bank-crawler/bank-crawler.toml`
pub fn default_config_path() -> PathBuf {
    let local_config = PathBuf::from("bank-crawler.toml");
    if local_config.exists() {
        return local_config;
    }

    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("bank-crawler").join("bank-crawler.toml");
    }

    local_config
}
