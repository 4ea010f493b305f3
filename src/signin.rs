//! Sign-in flow.
//!
//! Credentials are typed into the portal's form and the landing page is
//! confirmed by waiting for its accounts region. Security-question challenges
//! are not answered: when the portal shows one, the landing wait times out
//! and sign-in reports failure.

use std::fmt;
use std::time::Duration;

use secrecy::ExposeSecret;
use tracing::{info, warn};

use crate::error::Result;
use crate::models::User;
use crate::navigate::Navigator;
use crate::session::{Locator, Session};
use crate::wait::{Condition, ConditionWaiter, Wait};

pub const DEFAULT_SIGN_IN_URL: &str = "https://www.bankofamerica.com/";

/// Where sign-in has got to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInState {
    Start,
    CredentialsEntered,
    Submitted,
    Authenticated,
    Failed,
}

impl fmt::Display for SignInState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SignInState::Start => "start",
            SignInState::CredentialsEntered => "credentials entered",
            SignInState::Submitted => "submitted",
            SignInState::Authenticated => "authenticated",
            SignInState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Locations of the sign-in form and the landing marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInPage {
    pub url: String,
    pub online_id_field: Locator,
    pub passcode_field: Locator,
    /// Visible only once the user is signed in.
    pub landing_marker: Locator,
}

impl Default for SignInPage {
    fn default() -> Self {
        Self {
            url: DEFAULT_SIGN_IN_URL.to_string(),
            online_id_field: Locator::css("#oid"),
            passcode_field: Locator::css("#pass"),
            landing_marker: Locator::css("div.Accounts"),
        }
    }
}

/// Drives one sign-in attempt.
pub struct SignIn<'a> {
    page: &'a SignInPage,
    navigator: &'a Navigator,
    waiter: &'a ConditionWaiter,
    timeout: Duration,
    state: SignInState,
}

impl<'a> SignIn<'a> {
    pub fn new(
        page: &'a SignInPage,
        navigator: &'a Navigator,
        waiter: &'a ConditionWaiter,
        timeout: Duration,
    ) -> Self {
        Self {
            page,
            navigator,
            waiter,
            timeout,
            state: SignInState::Start,
        }
    }

    pub fn state(&self) -> SignInState {
        self.state
    }

    /// Sign `user` in. Returns whether the landing page was reached; any
    /// failing step leaves the machine in [`SignInState::Failed`]. There is no
    /// retry here.
    pub async fn run(&mut self, session: &dyn Session, user: &User) -> bool {
        match self.advance(session, user).await {
            Ok(true) => {
                self.state = SignInState::Authenticated;
                info!("signed in");
                true
            }
            Ok(false) => {
                warn!(
                    reached = %self.state,
                    "landing page never appeared; security question or bad credentials?"
                );
                self.state = SignInState::Failed;
                false
            }
            Err(err) => {
                warn!(reached = %self.state, error = %err, "sign-in failed");
                self.state = SignInState::Failed;
                false
            }
        }
    }

    async fn advance(&mut self, session: &dyn Session, user: &User) -> Result<bool> {
        self.navigator.navigate(session, &self.page.url).await?;

        let online_id = self
            .waiter
            .wait_for_element(
                session,
                &Condition::Presence(self.page.online_id_field.clone()),
                self.timeout,
            )
            .await?;
        online_id.send_keys(&user.online_id).await?;

        let passcode = self
            .waiter
            .wait_for_element(
                session,
                &Condition::Clickable(self.page.passcode_field.clone()),
                self.timeout,
            )
            .await?;
        passcode.send_keys(user.passcode.expose_secret()).await?;
        self.state = SignInState::CredentialsEntered;

        passcode.press_enter().await?;
        self.state = SignInState::Submitted;

        let landing = self
            .waiter
            .wait_for(
                session,
                &Condition::Visibility(self.page.landing_marker.clone()),
                self.timeout,
            )
            .await?;
        Ok(!matches!(landing, Wait::TimedOut))
    }
}
