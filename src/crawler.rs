//! End-to-end crawl: sign in, list accounts, fetch each account's detail.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};
use url::Url;

use crate::clock::Clock;
use crate::error::{CrawlError, Result};
use crate::models::{Account, User};
use crate::navigate::Navigator;
use crate::parser::{extract_detail, AccountListParser, DEFAULT_SECURE_BASE_URL};
use crate::session::{Locator, Session};
use crate::signin::{SignIn, SignInPage};
use crate::wait::{Condition, ConditionWaiter, Wait, DEFAULT_TIMEOUT};

/// Title of a detail page, naming the account it shows.
const ACCOUNT_TITLE: &str = "a[name='page_title_acct_switcher'] > span:nth-child(2)";

/// Settings for one crawl.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub sign_in: SignInPage,
    /// Base for resolving the relative detail links on the landing page.
    pub secure_base_url: String,
    pub wait_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            sign_in: SignInPage::default(),
            secure_base_url: DEFAULT_SECURE_BASE_URL.to_string(),
            wait_timeout: DEFAULT_TIMEOUT,
            poll_interval: crate::wait::DEFAULT_POLL_INTERVAL,
        }
    }
}

/// An account whose detail could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedAccount {
    pub name: String,
    pub reason: String,
}

/// What a crawl accomplished.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlReport {
    pub signed_in: bool,
    /// Names of accounts whose detail was fetched, in fetch order.
    pub fetched: Vec<String>,
    pub skipped: Vec<SkippedAccount>,
}

/// Drives a single browser session through one crawl.
///
/// The session is used by one crawl at a time; accounts are fetched strictly
/// one after another.
pub struct Crawler<S: Session> {
    session: S,
    options: CrawlOptions,
    navigator: Navigator,
    waiter: ConditionWaiter,
}

impl<S: Session> Crawler<S> {
    pub fn new(session: S, clock: Arc<dyn Clock>, options: CrawlOptions) -> Self {
        let waiter = ConditionWaiter::new(clock.clone()).with_poll_interval(options.poll_interval);
        Self {
            session,
            options,
            navigator: Navigator::new(clock),
            waiter,
        }
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// Sign in and collect the `wanted` accounts into `user.accounts`.
    ///
    /// A failed sign-in is reported, not returned as an error. Only a
    /// navigation that keeps timing out aborts the crawl.
    pub async fn start(&self, user: &mut User, wanted: &HashSet<String>) -> Result<CrawlReport> {
        let base_url =
            Url::parse(&self.options.secure_base_url).map_err(|e| CrawlError::InvalidUrl {
                url: self.options.secure_base_url.clone(),
                reason: e.to_string(),
            })?;
        let mut report = CrawlReport::default();

        let mut sign_in = SignIn::new(
            &self.options.sign_in,
            &self.navigator,
            &self.waiter,
            self.options.wait_timeout,
        );
        report.signed_in = sign_in.run(&self.session, user).await;
        if !report.signed_in {
            return Ok(report);
        }

        let markup = self.session.page_markup().await?;
        let listed = AccountListParser::new(&markup, base_url).get_accounts(wanted)?;
        info!(count = listed.len(), "found requested accounts");

        let first_new = user.accounts.len();
        user.accounts.extend(listed);

        for account in &mut user.accounts[first_new..] {
            match self.fetch_detail(account).await {
                Ok(()) => report.fetched.push(account.name.clone()),
                Err(err @ CrawlError::NavigationTimeout { .. }) => return Err(err),
                Err(err) => {
                    warn!(account = %account.name, error = %err, "skipping account");
                    report.skipped.push(SkippedAccount {
                        name: account.name.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }

    async fn fetch_detail(&self, account: &mut Account) -> Result<()> {
        self.navigator.navigate(&self.session, &account.link).await?;

        let title = Condition::text_contains(Locator::css(ACCOUNT_TITLE), account.name.as_str());
        let confirmed = self
            .waiter
            .wait_for(&self.session, &title, self.options.wait_timeout)
            .await?;
        if matches!(confirmed, Wait::TimedOut) {
            return Err(CrawlError::WaitTimeout {
                condition: title.to_string(),
            });
        }

        let markup = self.session.page_markup().await?;
        let detail = extract_detail(account.account_type, &markup)?;
        info!(
            account = %account.name,
            balance = ?detail.balance,
            transactions = detail.transactions.len(),
            "fetched account detail"
        );
        account.record_detail(detail.balance, detail.transactions);
        Ok(())
    }

    /// End the browser session.
    pub async fn end(self) -> Result<()> {
        self.session.quit().await?;
        Ok(())
    }
}
