#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use bank_crawler::error::SessionError;
use bank_crawler::session::{Element, Locator, Session, SessionResult};

/// How a scripted element behaves.
#[derive(Debug, Clone)]
pub struct ElementSpec {
    pub text: String,
    pub rendered_text: Option<String>,
    pub attributes: HashMap<String, String>,
    pub displayed: bool,
    pub enabled: bool,
    /// Pressing Enter on this element moves the session to this URL.
    pub enter_navigates_to: Option<String>,
    /// Number of upcoming reads that fail with a stale-element error.
    pub stale_reads: Arc<AtomicUsize>,
}

impl ElementSpec {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            rendered_text: None,
            attributes: HashMap::new(),
            displayed: true,
            enabled: true,
            enter_navigates_to: None,
            stale_reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_rendered_text(mut self, text: impl Into<String>) -> Self {
        self.rendered_text = Some(text.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn stale_for(self, reads: usize) -> Self {
        self.stale_reads.store(reads, Ordering::SeqCst);
        self
    }

    pub fn submits_to(mut self, url: impl Into<String>) -> Self {
        self.enter_navigates_to = Some(url.into());
        self
    }

    fn check_stale(&self) -> SessionResult<()> {
        let remaining = self.stale_reads.load(Ordering::SeqCst);
        if remaining > 0 {
            self.stale_reads.store(remaining - 1, Ordering::SeqCst);
            return Err(SessionError::StaleElement("element is detached".to_string()));
        }
        Ok(())
    }
}

impl Default for ElementSpec {
    fn default() -> Self {
        Self::new()
    }
}

/// One scripted page.
#[derive(Debug, Clone, Default)]
pub struct FakePage {
    pub markup: String,
    pub title: String,
    pub elements: HashMap<Locator, ElementSpec>,
}

impl FakePage {
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_element(mut self, locator: Locator, element: ElementSpec) -> Self {
        self.elements.insert(locator, element);
        self
    }
}

#[derive(Debug, Default)]
pub struct FakeState {
    /// URL the page itself reports. `None` makes the location script return null.
    pub location: Option<String>,
    pub location_script_fails: bool,
    pub native_location_fails: bool,
    pub ready_state: String,
    pub pages: HashMap<String, FakePage>,
    /// Outcomes of upcoming loads. Loads succeed once this runs dry.
    pub load_results: VecDeque<SessionResult<()>>,
    /// Every URL passed to `load`, in order.
    pub loads: Vec<String>,
    /// Every `send_keys` call as (locator of the element, keys).
    pub typed: Vec<(Locator, String)>,
    pub enters: Vec<Locator>,
    pub markup_reads: usize,
    pub quit: bool,
}

/// A [`Session`] whose pages and failures are scripted up front.
#[derive(Clone, Default)]
pub struct FakeSession {
    state: Arc<Mutex<FakeState>>,
}

impl FakeSession {
    pub fn new() -> Self {
        let session = Self::default();
        session.state().ready_state = "complete".to_string();
        session
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn with_page(self, url: impl Into<String>, page: FakePage) -> Self {
        self.state().pages.insert(url.into(), page);
        self
    }

    pub fn at(self, url: impl Into<String>) -> Self {
        self.state().location = Some(url.into());
        self
    }

    pub fn queue_load(&self, result: SessionResult<()>) {
        self.state().load_results.push_back(result);
    }

    pub fn queue_load_timeouts(&self, count: usize) {
        for _ in 0..count {
            self.queue_load(Err(SessionError::Timeout("page load timed out".to_string())));
        }
    }

    pub fn loads(&self) -> Vec<String> {
        self.state().loads.clone()
    }

    pub fn typed(&self) -> Vec<(Locator, String)> {
        self.state().typed.clone()
    }

    fn current_page(&self) -> Option<FakePage> {
        let state = self.state();
        let location = state.location.as_ref()?;
        state.pages.get(location).cloned()
    }
}

#[async_trait]
impl Session for FakeSession {
    async fn evaluate_script(&self, script: &str) -> SessionResult<serde_json::Value> {
        let state = self.state();
        match script {
            "window.location.href" if state.location_script_fails => {
                Err(SessionError::Script("script execution failed".to_string()))
            }
            "window.location.href" => Ok(state
                .location
                .clone()
                .map(serde_json::Value::String)
                .unwrap_or(serde_json::Value::Null)),
            "document.readyState" => Ok(serde_json::Value::String(state.ready_state.clone())),
            other => Err(SessionError::Script(format!("unscripted script {other:?}"))),
        }
    }

    async fn native_location(&self) -> SessionResult<String> {
        let state = self.state();
        if state.native_location_fails {
            return Err(SessionError::Driver("no current URL".to_string()));
        }
        Ok(state.location.clone().unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn load(&self, url: &str) -> SessionResult<()> {
        let mut state = self.state();
        state.loads.push(url.to_string());
        let result = state.load_results.pop_front().unwrap_or(Ok(()));
        if result.is_ok() {
            state.location = Some(url.to_string());
        }
        result
    }

    async fn page_markup(&self) -> SessionResult<String> {
        self.state().markup_reads += 1;
        Ok(self.current_page().map(|page| page.markup).unwrap_or_default())
    }

    async fn title(&self) -> SessionResult<String> {
        Ok(self.current_page().map(|page| page.title).unwrap_or_default())
    }

    async fn find_element(&self, locator: &Locator) -> SessionResult<Option<Box<dyn Element>>> {
        Ok(self.find_elements(locator).await?.into_iter().next())
    }

    async fn find_elements(&self, locator: &Locator) -> SessionResult<Vec<Box<dyn Element>>> {
        let Some(page) = self.current_page() else {
            return Ok(Vec::new());
        };
        Ok(page
            .elements
            .get(locator)
            .cloned()
            .map(|spec| {
                Box::new(FakeElement {
                    locator: locator.clone(),
                    spec,
                    state: self.state.clone(),
                }) as Box<dyn Element>
            })
            .into_iter()
            .collect())
    }

    async fn quit(&self) -> SessionResult<()> {
        self.state().quit = true;
        Ok(())
    }
}

pub struct FakeElement {
    locator: Locator,
    spec: ElementSpec,
    state: Arc<Mutex<FakeState>>,
}

impl FakeElement {
    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Element for FakeElement {
    async fn text(&self) -> SessionResult<String> {
        self.spec.check_stale()?;
        Ok(self.spec.text.clone())
    }

    async fn rendered_text(&self) -> SessionResult<Option<String>> {
        self.spec.check_stale()?;
        Ok(self.spec.rendered_text.clone())
    }

    async fn attribute(&self, name: &str) -> SessionResult<Option<String>> {
        Ok(self.spec.attributes.get(name).cloned())
    }

    async fn is_displayed(&self) -> SessionResult<bool> {
        self.spec.check_stale()?;
        Ok(self.spec.displayed)
    }

    async fn is_enabled(&self) -> SessionResult<bool> {
        self.spec.check_stale()?;
        Ok(self.spec.enabled)
    }

    async fn send_keys(&self, keys: &str) -> SessionResult<()> {
        self.state().typed.push((self.locator.clone(), keys.to_string()));
        Ok(())
    }

    async fn press_enter(&self) -> SessionResult<()> {
        let mut state = self.state();
        state.enters.push(self.locator.clone());
        if let Some(url) = &self.spec.enter_navigates_to {
            state.location = Some(url.clone());
        }
        Ok(())
    }

    async fn click(&self) -> SessionResult<()> {
        Ok(())
    }
}

pub const SIGN_IN_URL: &str = "https://bank.test/";
pub const LANDING_URL: &str = "https://secure.bank.test/myaccounts/overview";
pub const SECURE_BASE_URL: &str = "https://secure.bank.test";

/// Landing page listing one deposit and one credit card account, plus an
/// account nobody asks for.
pub const LANDING_MARKUP: &str = r#"
<html><body>
  <div class="Accounts">
    <div class="AccountItem AccountItemDeposit">
      <span class="AccountName"><a href="/deposit/detail?acct=1">Adv  Plus
        Banking - 1111</a></span>
    </div>
    <div class="AccountItem AccountItemCreditCard">
      <span class="AccountName"><a href="/cards/detail?acct=2">Cash Rewards - 2222</a></span>
    </div>
    <div class="AccountItem AccountItemDeposit">
      <span class="AccountName"><a href="/deposit/detail?acct=3">Savings - 3333</a></span>
    </div>
  </div>
</body></html>
"#;

pub const DEPOSIT_NAME: &str = "Adv Plus Banking - 1111";
pub const DEPOSIT_URL: &str = "https://secure.bank.test/deposit/detail?acct=1";
pub const CARD_NAME: &str = "Cash Rewards - 2222";
pub const CARD_URL: &str = "https://secure.bank.test/cards/detail?acct=2";

pub const DEPOSIT_MARKUP: &str = r#"
<html><body>
  <div class="ad-acct-summary-module-deposit-skin">
    <span class="TL_NPI_Amt">$1,234.56</span>
  </div>
  <table class="transaction-records">
    <tbody>
      <tr class="record">
        <td class="description">  PAYROLL
          DEPOSIT </td>
        <td class="amount">$2,000.00</td>
        <td class="balance">$1,234.56</td>
      </tr>
      <tr class="in-transit-record">
        <td class="description">COFFEE</td>
        <td class="amount">-$4.50</td>
      </tr>
    </tbody>
  </table>
</body></html>
"#;

pub const CARD_MARKUP: &str = r#"
<html><body>
  <div class="summary-details-row">
    <div class="summary-acct-row"><span class="TL_NPI_L1">$500.25</span></div>
  </div>
  <table id="transactions">
    <tbody>
      <tr class="trans-pending-row">
        <td class="trans-desc-cell"><a><span class="icon"></span> GROCERY STORE </a></td>
        <td class="trans-amount-cell">-$12.34</td>
        <td class="trans-balance-cell">$512.59</td>
      </tr>
      <tr>
        <td class="trans-desc-cell"><a><span class="icon"></span> PAYMENT </a></td>
        <td class="trans-amount-cell">$100.00</td>
        <td class="trans-balance-cell">$500.25</td>
      </tr>
    </tbody>
  </table>
</body></html>
"#;

/// The title element detail pages show for `name`.
pub fn account_title(name: &str) -> (Locator, ElementSpec) {
    (
        Locator::css("a[name='page_title_acct_switcher'] > span:nth-child(2)"),
        ElementSpec::new().with_text(name),
    )
}

/// A portal whose sign-in form submits straight to the landing page.
pub fn portal() -> FakeSession {
    let sign_in = FakePage::new("<html><body><form></form></body></html>")
        .with_element(Locator::css("#oid"), ElementSpec::new())
        .with_element(
            Locator::css("#pass"),
            ElementSpec::new().submits_to(LANDING_URL),
        );
    let landing = FakePage::new(LANDING_MARKUP)
        .with_element(Locator::css("div.Accounts"), ElementSpec::new());

    let (title_locator, deposit_title) = account_title(DEPOSIT_NAME);
    let deposit = FakePage::new(DEPOSIT_MARKUP).with_element(title_locator, deposit_title);
    let (title_locator, card_title) = account_title(CARD_NAME);
    let card = FakePage::new(CARD_MARKUP).with_element(title_locator, card_title);

    FakeSession::new()
        .at("about:blank")
        .with_page(SIGN_IN_URL, sign_in)
        .with_page(LANDING_URL, landing)
        .with_page(DEPOSIT_URL, deposit)
        .with_page(CARD_URL, card)
}
