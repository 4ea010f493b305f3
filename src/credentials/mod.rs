//! Where the portal credentials come from.
//!
//! A store maps logical keys ([`ONLINE_ID`], [`PASSCODE`]) to secrets held
//! by some backend. Which backend is used is chosen in the crawler config:
//!
//! ```toml
//! [credentials]
//! backend = "pass"
//! path = "finance/bank"
//!
//! [credentials.fields]
//! online_id = "login"
//! ```

mod config;
mod env;
mod pass;

pub use config::CredentialConfig;
pub use env::{EnvConfig, EnvCredentialStore};
pub use pass::{PassConfig, PassCredentialStore};

use anyhow::{Context, Result};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::models::User;

/// Key of the portal user name.
pub const ONLINE_ID: &str = "online_id";
/// Key of the portal password.
pub const PASSCODE: &str = "passcode";

/// A read-only key-value store for credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Retrieve a credential by key.
    ///
    /// Returns `Ok(None)` if the key doesn't exist.
    /// Returns `Err` if there was an error accessing the backend.
    async fn get(&self, key: &str) -> Result<Option<SecretString>>;
}

/// Build a [`User`] from the online id and passcode held in `store`.
pub async fn load_user(store: &dyn CredentialStore) -> Result<User> {
    let online_id = store
        .get(ONLINE_ID)
        .await?
        .with_context(|| format!("No {ONLINE_ID} credential found"))?;
    let passcode = store
        .get(PASSCODE)
        .await?
        .with_context(|| format!("No {PASSCODE} credential found"))?;

    Ok(User::new(online_id.expose_secret(), passcode.expose_secret()))
}
