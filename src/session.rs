//! The browser capabilities the crawler depends on.
//!
//! Nothing here knows about a particular automation product; the
//! chromiumoxide-backed implementation lives in [`crate::browser`] and tests
//! drive the pipeline through scripted fakes.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SessionError;

pub type SessionResult<T> = std::result::Result<T, SessionError>;

/// How a locator's value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocatorKind {
    Css,
    XPath,
    ClassName,
}

/// Identifies an element within rendered markup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    pub kind: LocatorKind,
    pub value: String,
}

impl Locator {
    pub fn new(kind: LocatorKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    pub fn css(value: impl Into<String>) -> Self {
        Self::new(LocatorKind::Css, value)
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Self::new(LocatorKind::XPath, value)
    }

    pub fn class_name(value: impl Into<String>) -> Self {
        Self::new(LocatorKind::ClassName, value)
    }

    /// The equivalent CSS selector, for kinds that have one.
    pub fn to_css(&self) -> Option<String> {
        match self.kind {
            LocatorKind::Css => Some(self.value.clone()),
            LocatorKind::ClassName => Some(format!(".{}", self.value.trim())),
            LocatorKind::XPath => None,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            LocatorKind::Css => "css",
            LocatorKind::XPath => "xpath",
            LocatorKind::ClassName => "class",
        };
        write!(f, "{kind}={}", self.value)
    }
}

/// A handle to one element of the live page.
#[async_trait]
pub trait Element: Send + Sync {
    /// Text as exposed by the driver.
    async fn text(&self) -> SessionResult<String>;

    /// The element's rendered `innerText`, which can differ from [`text`]
    /// for nodes populated by client-side script.
    ///
    /// [`text`]: Element::text
    async fn rendered_text(&self) -> SessionResult<Option<String>>;

    async fn attribute(&self, name: &str) -> SessionResult<Option<String>>;

    async fn is_displayed(&self) -> SessionResult<bool>;

    async fn is_enabled(&self) -> SessionResult<bool>;

    async fn send_keys(&self, keys: &str) -> SessionResult<()>;

    /// Simulate the Enter key, submitting the surrounding form.
    async fn press_enter(&self) -> SessionResult<()>;

    async fn click(&self) -> SessionResult<()>;
}

/// A live browser session driving one page.
#[async_trait]
pub trait Session: Send + Sync {
    /// Evaluate a script in the page and return its JSON result.
    async fn evaluate_script(&self, script: &str) -> SessionResult<serde_json::Value>;

    /// The driver's own notion of the current URL.
    async fn native_location(&self) -> SessionResult<String>;

    /// Load `url`, resolving once the driver considers the page loaded.
    async fn load(&self, url: &str) -> SessionResult<()>;

    async fn page_markup(&self) -> SessionResult<String>;

    async fn title(&self) -> SessionResult<String>;

    /// First element matching `locator`, or `None` when nothing matches.
    async fn find_element(&self, locator: &Locator) -> SessionResult<Option<Box<dyn Element>>>;

    async fn find_elements(&self, locator: &Locator) -> SessionResult<Vec<Box<dyn Element>>>;

    async fn quit(&self) -> SessionResult<()>;
}
