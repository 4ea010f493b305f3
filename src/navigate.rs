//! Page loads with bounded retry.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::error::{CrawlError, Result};
use crate::session::Session;

/// Load timeouts retried after the first attempt.
pub const MAX_RETRIES: u32 = 7;

/// Pause after each load attempt, successful or not, so client-side
/// rendering can settle.
pub const SETTLE_DELAY: Duration = Duration::from_secs(2);

const LOCATION_SCRIPT: &str = "window.location.href";

/// What [`Navigator::navigate`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// The session was already at the destination; nothing was loaded.
    AlreadyThere,
    /// The page was loaded after `attempts` tries.
    Loaded { attempts: u32 },
}

/// Current URL of the session, or `None` when the driver cannot tell.
///
/// Asks the page itself first and falls back to the driver's own accessor.
pub async fn current_location(session: &dyn Session) -> Option<String> {
    match session.evaluate_script(LOCATION_SCRIPT).await {
        Ok(serde_json::Value::String(href)) => return Some(href),
        Ok(other) => debug!(value = %other, "location script returned a non-string"),
        Err(err) => debug!(error = %err, "location script failed; using driver location"),
    }

    match session.native_location().await {
        Ok(location) => Some(location),
        Err(err) => {
            debug!(error = %err, "driver location unavailable");
            None
        }
    }
}

fn same_destination(current: &str, target: &str) -> bool {
    fn trim(url: &str) -> &str {
        url.strip_suffix('/').unwrap_or(url)
    }
    trim(current) == trim(target)
}

#[derive(Clone)]
pub struct Navigator {
    clock: Arc<dyn Clock>,
}

impl Navigator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Navigate to `url` unless the session is already there.
    ///
    /// Load timeouts are retried up to [`MAX_RETRIES`] times with
    /// [`SETTLE_DELAY`] between attempts; other driver errors are returned
    /// immediately.
    pub async fn navigate(&self, session: &dyn Session, url: &str) -> Result<Navigation> {
        if let Some(current) = current_location(session).await {
            if same_destination(&current, url) {
                debug!(url, "already at destination");
                return Ok(Navigation::AlreadyThere);
            }
        }

        let mut timeouts = 0;
        loop {
            match session.load(url).await {
                Ok(()) => {
                    self.clock.sleep(SETTLE_DELAY).await;
                    info!(url, attempts = timeouts + 1, "page loaded");
                    return Ok(Navigation::Loaded {
                        attempts: timeouts + 1,
                    });
                }
                Err(err) if err.is_timeout() => {
                    if timeouts >= MAX_RETRIES {
                        return Err(CrawlError::NavigationTimeout {
                            url: url.to_string(),
                            retries: timeouts,
                            last_error: err,
                        });
                    }
                    timeouts += 1;
                    warn!(url, attempt = timeouts, error = %err, "page load timed out; retrying");
                    self.clock.sleep(SETTLE_DELAY).await;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}
