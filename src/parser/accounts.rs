use std::collections::HashSet;

use scraper::{ElementRef, Html};
use tracing::{debug, warn};
use url::Url;

use super::{element_text, has_class, select_within, selector};
use crate::error::Result;
use crate::models::{Account, AccountType};
use crate::normalize::normalize_whitespace;

/// Host serving the authenticated account pages.
pub const DEFAULT_SECURE_BASE_URL: &str = "https://secure.bankofamerica.com";

const ACCOUNT_ITEM: &str = ".Accounts .AccountItem";
const ACCOUNT_NAME_LINK: &str = ".AccountName > a";

/// Item class to account type.
const ACCOUNT_CLASSES: [(&str, AccountType); 2] = [
    ("AccountItemDeposit", AccountType::Deposit),
    ("AccountItemCreditCard", AccountType::CreditCard),
];

/// Reads the account list off the authenticated landing page.
pub struct AccountListParser {
    document: Html,
    base_url: Url,
}

impl AccountListParser {
    pub fn new(markup: &str, base_url: Url) -> Self {
        Self {
            document: Html::parse_document(markup),
            base_url,
        }
    }

    /// Accounts whose display name is in `wanted`, in page order.
    ///
    /// Names that are not on the page are simply absent from the result, and
    /// items of an unknown kind are skipped.
    pub fn get_accounts(&self, wanted: &HashSet<String>) -> Result<Vec<Account>> {
        let mut accounts = Vec::new();

        for item in self.document.select(&selector(ACCOUNT_ITEM)?) {
            let Some(name_link) = select_within(item, ACCOUNT_NAME_LINK)? else {
                continue;
            };
            let name = normalize_whitespace(&element_text(name_link));
            if !wanted.contains(&name) {
                debug!(account = %name, "account not requested");
                continue;
            }

            let Some(account_type) = account_type(item) else {
                warn!(account = %name, "account item has no known type; skipping");
                continue;
            };

            let Some(href) = name_link.value().attr("href") else {
                warn!(account = %name, "account item has no detail link; skipping");
                continue;
            };
            let link = match self.base_url.join(href) {
                Ok(link) => link,
                Err(err) => {
                    warn!(account = %name, href, error = %err, "invalid detail link; skipping");
                    continue;
                }
            };

            accounts.push(Account::new(name, account_type, link.to_string()));
        }

        Ok(accounts)
    }
}

fn account_type(item: ElementRef<'_>) -> Option<AccountType> {
    ACCOUNT_CLASSES
        .iter()
        .find(|(class, _)| has_class(item, class))
        .map(|(_, account_type)| *account_type)
}
