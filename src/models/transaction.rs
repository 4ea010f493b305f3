use serde::{Deserialize, Serialize};

/// One row of an account's transaction history.
///
/// Every cell is optional in the source markup, so fields the page did not
/// render stay `None` instead of failing the whole account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Whitespace-normalized description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Signed amount in cents - negative for debits, positive for credits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    /// Not yet settled into the ledger.
    #[serde(default)]
    pub is_pending: bool,
    /// Running balance after this transaction, in cents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ending_balance: Option<i64>,
}

impl Transaction {
    pub fn new(description: impl Into<String>, amount: i64) -> Self {
        Self {
            description: Some(description.into()),
            amount: Some(amount),
            ..Self::default()
        }
    }

    pub fn pending(mut self, is_pending: bool) -> Self {
        self.is_pending = is_pending;
        self
    }

    pub fn with_ending_balance(mut self, ending_balance: i64) -> Self {
        self.ending_balance = Some(ending_balance);
        self
    }
}
