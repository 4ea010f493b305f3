use std::collections::HashMap;
use std::fmt;

use secrecy::SecretString;

use super::Account;

/// Portal credentials plus the accounts collected for them.
///
/// The caller owns the user; a crawl only ever appends to `accounts`.
pub struct User {
    pub online_id: String,
    pub passcode: SecretString,
    /// Answers keyed by security question text. Not used by sign-in yet.
    pub security_responses: HashMap<String, SecretString>,
    pub accounts: Vec<Account>,
}

impl User {
    pub fn new(online_id: impl Into<String>, passcode: impl Into<String>) -> Self {
        Self {
            online_id: online_id.into(),
            passcode: SecretString::from(passcode.into()),
            security_responses: HashMap::new(),
            accounts: Vec::new(),
        }
    }

    pub fn with_security_response(
        mut self,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        self.security_responses
            .insert(question.into(), SecretString::from(answer.into()));
        self
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("online_id", &self.online_id)
            .field("passcode", &"[REDACTED]")
            .field("security_responses", &self.security_responses.len())
            .field("accounts", &self.accounts)
            .finish()
    }
}
