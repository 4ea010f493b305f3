use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Transaction;
use crate::error::CrawlError;

/// Kind of account, as told apart by the portal's markup. Decides which
/// detail parser runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    CreditCard,
    Deposit,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::CreditCard => "CreditCard",
            AccountType::Deposit => "Deposit",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = CrawlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CreditCard" => Ok(AccountType::CreditCard),
            "Deposit" => Ok(AccountType::Deposit),
            other => Err(CrawlError::UnsupportedAccountType(other.to_string())),
        }
    }
}

/// An account listed on the portal's landing page.
///
/// `balance` and `transactions` stay `None` until the detail page has been
/// fetched, and are then set together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Display name, used both for matching and for confirming the detail page.
    pub name: String,
    pub account_type: AccountType,
    /// Absolute URL of the detail page.
    pub link: String,
    /// Balance in cents.
    #[serde(default)]
    pub balance: Option<i64>,
    /// Most recent first, as rendered.
    #[serde(default)]
    pub transactions: Option<Vec<Transaction>>,
}

impl Account {
    pub fn new(
        name: impl Into<String>,
        account_type: AccountType,
        link: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            account_type,
            link: link.into(),
            balance: None,
            transactions: None,
        }
    }

    /// Record the result of a detail fetch.
    pub fn record_detail(&mut self, balance: Option<i64>, transactions: Vec<Transaction>) {
        self.balance = balance;
        self.transactions = Some(transactions);
    }

    pub fn is_fetched(&self) -> bool {
        self.transactions.is_some()
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let balance = self
            .balance
            .map(|b| b.to_string())
            .unwrap_or_else(|| "None".to_string());
        let count = self.transactions.as_ref().map(Vec::len).unwrap_or(0);
        write!(
            f,
            "<Account ({}) {}, {}, {} transactions>",
            self.account_type, self.name, balance, count
        )
    }
}
