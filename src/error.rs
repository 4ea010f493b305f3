use thiserror::Error;

pub type Result<T> = std::result::Result<T, CrawlError>;

/// Currency text that could not be turned into cents.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid currency value {input:?}")]
pub struct FormatError {
    pub input: String,
}

/// Failures reported by a browser session.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The page did not finish loading in time.
    #[error("page load timed out: {0}")]
    Timeout(String),

    /// The element was detached from the document after it was located.
    #[error("stale element reference: {0}")]
    StaleElement(String),

    #[error("no such element: {0}")]
    NoSuchElement(String),

    #[error("script evaluation failed: {0}")]
    Script(String),

    #[error("browser driver error: {0}")]
    Driver(String),
}

impl SessionError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, SessionError::Timeout(_))
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, SessionError::StaleElement(_))
    }
}

#[derive(Debug, Error)]
pub enum CrawlError {
    /// Every load attempt timed out. `retries` counts the attempts after the
    /// first one.
    #[error("Retried {retries} times to GET {url:?} but failed out of a timeout: {last_error}")]
    NavigationTimeout {
        url: String,
        retries: u32,
        last_error: SessionError,
    },

    #[error("unsupported account type: {0:?}")]
    UnsupportedAccountType(String),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("timed out waiting for {condition}")]
    WaitTimeout { condition: String },

    #[error("invalid selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Chrome/Chromium not found; install it or set browser.chrome_path")]
    ChromeNotFound,

    #[error("failed to launch browser: {0}")]
    Launch(String),
}
