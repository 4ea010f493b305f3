//! HTML extraction for the portal's landing and account detail pages.
//!
//! Parsers work on page markup captured from the session, so they are pure
//! functions of the HTML. Missing elements leave fields unset; only
//! malformed currency text is an error.

mod accounts;
mod credit_card;
mod deposit;

pub use accounts::{AccountListParser, DEFAULT_SECURE_BASE_URL};
pub use credit_card::parse_credit_card;
pub use deposit::parse_deposit;

use scraper::{ElementRef, Html, Selector};

use crate::error::{CrawlError, Result};
use crate::models::{AccountType, Transaction};
use crate::normalize::dollars_to_cents;

/// Balance and transaction history read from one detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountDetail {
    /// Balance in cents, `None` when the page did not show one.
    pub balance: Option<i64>,
    pub transactions: Vec<Transaction>,
}

/// The detail page parser for one kind of account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailParser {
    CreditCard,
    Deposit,
}

impl DetailParser {
    pub fn parse(self, markup: &str) -> Result<AccountDetail> {
        match self {
            DetailParser::CreditCard => parse_credit_card(markup),
            DetailParser::Deposit => parse_deposit(markup),
        }
    }
}

/// Pick the detail parser for an account type.
pub fn parser_for(account_type: AccountType) -> DetailParser {
    match account_type {
        AccountType::CreditCard => DetailParser::CreditCard,
        AccountType::Deposit => DetailParser::Deposit,
    }
}

/// Pick the detail parser for an account type given by name, failing with
/// [`CrawlError::UnsupportedAccountType`] for names with no parser.
pub fn account_parser(account_type: &str) -> Result<DetailParser> {
    Ok(parser_for(account_type.parse()?))
}

/// Parse a detail page according to the account's type.
pub fn extract_detail(account_type: AccountType, markup: &str) -> Result<AccountDetail> {
    parser_for(account_type).parse(markup)
}

pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| CrawlError::InvalidSelector {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}

/// First match of `css` anywhere in the document.
pub(crate) fn select_one<'a>(document: &'a Html, css: &str) -> Result<Option<ElementRef<'a>>> {
    Ok(document.select(&selector(css)?).next())
}

/// First match of `css` below `element`.
pub(crate) fn select_within<'a>(
    element: ElementRef<'a>,
    css: &str,
) -> Result<Option<ElementRef<'a>>> {
    Ok(element.select(&selector(css)?).next())
}

pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

pub(crate) fn has_class(element: ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

/// Cents value of the first `css` match under `element`, if present.
pub(crate) fn cents_within(element: ElementRef<'_>, css: &str) -> Result<Option<i64>> {
    select_within(element, css)?
        .map(|cell| dollars_to_cents(element_text(cell).as_str()))
        .transpose()
        .map_err(Into::into)
}
