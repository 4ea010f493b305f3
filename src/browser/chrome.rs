use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element as CdpElement;
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::resolve_chrome;
use crate::config::BrowserOptions;
use crate::error::{CrawlError, Result, SessionError};
use crate::session::{Element, Locator, LocatorKind, Session, SessionResult};

const TEXT_FN: &str = "function() { return this.textContent; }";
const DISPLAYED_FN: &str = "function() {
    const style = window.getComputedStyle(this);
    return style.visibility !== 'hidden'
        && style.display !== 'none'
        && this.getClientRects().length > 0;
}";
const ENABLED_FN: &str = "function() { return !this.disabled; }";

/// CDP messages meaning the node or its page went away after it was located.
const STALE_MESSAGES: [&str; 5] = [
    "Could not find node with given id",
    "No node with given id found",
    "Node with given id does not belong to the document",
    "Cannot find context with specified id",
    "Execution context was destroyed",
];

fn session_error(err: CdpError) -> SessionError {
    match err {
        CdpError::Timeout => SessionError::Timeout("CDP request timed out".to_string()),
        CdpError::NotFound => SessionError::NoSuchElement("node not found".to_string()),
        other => {
            let message = other.to_string();
            if STALE_MESSAGES.iter().any(|m| message.contains(m)) {
                SessionError::StaleElement(message)
            } else {
                SessionError::Driver(message)
            }
        }
    }
}

/// A Chrome/Chromium browser driven over the DevTools protocol, with one page.
pub struct ChromeSession {
    browser: Mutex<Browser>,
    page: Page,
    handler_task: JoinHandle<()>,
    page_load_timeout: Duration,
}

impl ChromeSession {
    /// Launch a browser according to `options` and open a blank page.
    pub async fn launch(options: &BrowserOptions) -> Result<Self> {
        let chrome_path = resolve_chrome(options)?;
        info!(chrome = %chrome_path.display(), headless = options.headless, "launching browser");

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .viewport(None)
            .request_timeout(options.page_load_timeout)
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-infobars")
            .arg("--no-first-run")
            .arg("--no-default-browser-check");
        if !options.headless {
            builder = builder.with_head();
        }
        if options.disable_images {
            builder = builder.arg("--blink-settings=imagesEnabled=false");
        }
        if let Some(profile_dir) = &options.profile_dir {
            builder = builder.user_data_dir(profile_dir);
        }
        let config = builder
            .build()
            .map_err(|e| CrawlError::Launch(format!("Failed to configure browser: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| CrawlError::Launch(e.to_string()))?;
        let handler_task = tokio::spawn(async move { while (handler.next().await).is_some() {} });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| CrawlError::Launch(format!("Failed to open page: {e}")))?;

        Ok(Self {
            browser: Mutex::new(browser),
            page,
            handler_task,
            page_load_timeout: options.page_load_timeout,
        })
    }

    async fn query(&self, locator: &Locator) -> SessionResult<Vec<CdpElement>> {
        let found = match locator.kind {
            LocatorKind::XPath => self.page.find_xpaths(locator.value.as_str()).await,
            LocatorKind::Css | LocatorKind::ClassName => {
                let css = locator.to_css().unwrap_or_default();
                self.page.find_elements(css).await
            }
        };
        match found {
            Ok(elements) => Ok(elements),
            Err(CdpError::NotFound) => Ok(Vec::new()),
            Err(err) => Err(session_error(err)),
        }
    }
}

#[async_trait]
impl Session for ChromeSession {
    async fn evaluate_script(&self, script: &str) -> SessionResult<serde_json::Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| match session_error(e) {
                SessionError::Driver(message) => SessionError::Script(message),
                other => other,
            })?;
        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn native_location(&self) -> SessionResult<String> {
        self.page
            .url()
            .await
            .map_err(session_error)?
            .ok_or_else(|| SessionError::Driver("page has no URL".to_string()))
    }

    async fn load(&self, url: &str) -> SessionResult<()> {
        debug!(url, "loading page");
        match tokio::time::timeout(self.page_load_timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(err)) => Err(session_error(err)),
            Err(_) => Err(SessionError::Timeout(format!(
                "no load event after {:?}",
                self.page_load_timeout
            ))),
        }
    }

    async fn page_markup(&self) -> SessionResult<String> {
        self.page.content().await.map_err(session_error)
    }

    async fn title(&self) -> SessionResult<String> {
        Ok(self
            .page
            .get_title()
            .await
            .map_err(session_error)?
            .unwrap_or_default())
    }

    async fn find_element(&self, locator: &Locator) -> SessionResult<Option<Box<dyn Element>>> {
        Ok(self
            .query(locator)
            .await?
            .into_iter()
            .next()
            .map(|element| Box::new(ChromeElement { element }) as Box<dyn Element>))
    }

    async fn find_elements(&self, locator: &Locator) -> SessionResult<Vec<Box<dyn Element>>> {
        Ok(self
            .query(locator)
            .await?
            .into_iter()
            .map(|element| Box::new(ChromeElement { element }) as Box<dyn Element>)
            .collect())
    }

    async fn quit(&self) -> SessionResult<()> {
        let mut browser = self.browser.lock().await;
        browser.close().await.map_err(session_error)?;
        browser.wait().await.map_err(|e| SessionError::Driver(e.to_string()))?;
        self.handler_task.abort();
        Ok(())
    }
}

/// One node of a [`ChromeSession`] page.
pub struct ChromeElement {
    element: CdpElement,
}

impl ChromeElement {
    async fn call(&self, function: &str) -> SessionResult<serde_json::Value> {
        let returns = self
            .element
            .call_js_fn(function, false)
            .await
            .map_err(session_error)?;
        Ok(returns.result.value.unwrap_or(serde_json::Value::Null))
    }
}

#[async_trait]
impl Element for ChromeElement {
    async fn text(&self) -> SessionResult<String> {
        Ok(self
            .call(TEXT_FN)
            .await?
            .as_str()
            .unwrap_or_default()
            .to_string())
    }

    async fn rendered_text(&self) -> SessionResult<Option<String>> {
        self.element.inner_text().await.map_err(session_error)
    }

    async fn attribute(&self, name: &str) -> SessionResult<Option<String>> {
        self.element.attribute(name).await.map_err(session_error)
    }

    async fn is_displayed(&self) -> SessionResult<bool> {
        Ok(self.call(DISPLAYED_FN).await?.as_bool().unwrap_or(false))
    }

    async fn is_enabled(&self) -> SessionResult<bool> {
        Ok(self.call(ENABLED_FN).await?.as_bool().unwrap_or(false))
    }

    async fn send_keys(&self, keys: &str) -> SessionResult<()> {
        self.element.click().await.map_err(session_error)?;
        self.element.type_str(keys).await.map_err(session_error)?;
        Ok(())
    }

    async fn press_enter(&self) -> SessionResult<()> {
        self.element.press_key("Enter").await.map_err(session_error)?;
        Ok(())
    }

    async fn click(&self) -> SessionResult<()> {
        self.element.click().await.map_err(session_error)?;
        Ok(())
    }
}
