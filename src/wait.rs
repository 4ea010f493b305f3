//! Condition-based waiting against a live page.
//!
//! Client-side rendering means an element may not exist yet, may exist but be
//! hidden, or may be replaced between lookups. [`ConditionWaiter::wait_for`]
//! polls a [`Condition`] until it holds or the timeout budget is spent.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::clock::Clock;
use crate::error::{CrawlError, Result};
use crate::session::{Element, Locator, Session, SessionResult};

/// Default time budget for a single wait.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default delay between two evaluations of a condition.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Ready states accepted by [`Condition::DocumentReady`].
const READY_STATES: [&str; 2] = ["complete", "loaded"];

/// What to wait for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// An element matching the locator exists in the DOM.
    Presence(Locator),
    /// An element matching the locator exists and is displayed.
    Visibility(Locator),
    /// An element is present, displayed and enabled.
    Clickable(Locator),
    /// The element's text or rendered text contains `text`.
    TextContains { locator: Locator, text: String },
    /// The document title contains the given substring.
    TitleContains(String),
    /// `document.readyState` is `complete` (or `loaded`).
    DocumentReady,
}

impl Condition {
    pub fn text_contains(locator: Locator, text: impl Into<String>) -> Self {
        Condition::TextContains {
            locator,
            text: text.into(),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Presence(locator) => write!(f, "presence of {locator}"),
            Condition::Visibility(locator) => write!(f, "visibility of {locator}"),
            Condition::Clickable(locator) => write!(f, "{locator} to be clickable"),
            Condition::TextContains { locator, text } => {
                write!(f, "{text:?} in text of {locator}")
            }
            Condition::TitleContains(text) => write!(f, "title containing {text:?}"),
            Condition::DocumentReady => write!(f, "document ready"),
        }
    }
}

/// Result of a wait.
pub enum Wait {
    /// An element-based condition held; carries the element it matched.
    Element(Box<dyn Element>),
    /// A page-level condition held.
    Met,
    TimedOut,
}

impl Wait {
    pub fn is_met(&self) -> bool {
        !matches!(self, Wait::TimedOut)
    }

    pub fn into_element(self) -> Option<Box<dyn Element>> {
        match self {
            Wait::Element(element) => Some(element),
            _ => None,
        }
    }
}

impl fmt::Debug for Wait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Wait::Element(_) => f.write_str("Wait::Element(..)"),
            Wait::Met => f.write_str("Wait::Met"),
            Wait::TimedOut => f.write_str("Wait::TimedOut"),
        }
    }
}

/// Polls conditions against a session until they hold or time runs out.
#[derive(Clone)]
pub struct ConditionWaiter {
    clock: Arc<dyn Clock>,
    poll_interval: Duration,
}

impl ConditionWaiter {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Wait up to `timeout` for `condition`.
    ///
    /// A timeout is reported as [`Wait::TimedOut`], never as an error. A
    /// condition that trips over a stale element counts as not yet satisfied.
    /// Any other driver failure is returned as an error.
    pub async fn wait_for(
        &self,
        session: &dyn Session,
        condition: &Condition,
        timeout: Duration,
    ) -> Result<Wait> {
        let deadline = self.clock.now() + timeout;

        loop {
            match evaluate(session, condition).await {
                Ok(Some(outcome)) => return Ok(outcome),
                Ok(None) => {}
                Err(err) if err.is_stale() => {
                    debug!(condition = %condition, "stale element while polling; retrying");
                }
                Err(err) => return Err(err.into()),
            }

            let now = self.clock.now();
            if now >= deadline {
                debug!(condition = %condition, timeout = ?timeout, "wait timed out");
                return Ok(Wait::TimedOut);
            }
            self.clock
                .sleep(self.poll_interval.min(deadline - now))
                .await;
        }
    }

    /// Wait for an element-based condition and hand back the element, turning
    /// a timeout into [`CrawlError::WaitTimeout`].
    pub async fn wait_for_element(
        &self,
        session: &dyn Session,
        condition: &Condition,
        timeout: Duration,
    ) -> Result<Box<dyn Element>> {
        self.wait_for(session, condition, timeout)
            .await?
            .into_element()
            .ok_or_else(|| CrawlError::WaitTimeout {
                condition: condition.to_string(),
            })
    }
}

/// Evaluate a condition once. `Ok(None)` means "not yet".
async fn evaluate(session: &dyn Session, condition: &Condition) -> SessionResult<Option<Wait>> {
    match condition {
        Condition::Presence(locator) => Ok(session.find_element(locator).await?.map(Wait::Element)),
        Condition::Visibility(locator) => match session.find_element(locator).await? {
            Some(element) if element.is_displayed().await? => Ok(Some(Wait::Element(element))),
            _ => Ok(None),
        },
        Condition::Clickable(locator) => match session.find_element(locator).await? {
            Some(element) if element.is_displayed().await? && element.is_enabled().await? => {
                Ok(Some(Wait::Element(element)))
            }
            _ => Ok(None),
        },
        Condition::TextContains { locator, text } => {
            let Some(element) = session.find_element(locator).await? else {
                return Ok(None);
            };
            if element.text().await?.contains(text.as_str()) {
                return Ok(Some(Wait::Met));
            }
            let rendered = element.rendered_text().await?;
            Ok(rendered
                .filter(|rendered| rendered.contains(text.as_str()))
                .map(|_| Wait::Met))
        }
        Condition::TitleContains(text) => {
            let title = session.title().await?;
            Ok(title.contains(text.as_str()).then_some(Wait::Met))
        }
        Condition::DocumentReady => {
            let state = session.evaluate_script("document.readyState").await?;
            let ready = state
                .as_str()
                .is_some_and(|state| READY_STATES.contains(&state));
            Ok(ready.then_some(Wait::Met))
        }
    }
}
