use scraper::{ElementRef, Html};

use super::{
    cents_within, element_text, has_class, select_one, select_within, selector, AccountDetail,
};
use crate::error::Result;
use crate::models::Transaction;
use crate::normalize::{dollars_to_cents, normalize_whitespace};

const TRANSACTION_ROWS: &str = "table#transactions > tbody > tr";
const PENDING_ROW: &str = "trans-pending-row";
const DESCRIPTION_WRAPPER: &str = ".trans-desc-cell > a > span";
const CURRENT_BALANCE: &str = ".summary-details-row .summary-acct-row .TL_NPI_L1";

/// Parse a credit card detail page.
///
/// Transactions are read first: when the newest row is pending and shows a
/// running balance, that balance is more current than the statement summary
/// and is reported instead.
pub fn parse_credit_card(markup: &str) -> Result<AccountDetail> {
    let document = Html::parse_document(markup);
    let transactions = transactions(&document)?;

    let balance = match pending_balance(&transactions) {
        Some(balance) => Some(balance),
        None => current_balance(&document)?,
    };

    Ok(AccountDetail {
        balance,
        transactions,
    })
}

fn transactions(document: &Html) -> Result<Vec<Transaction>> {
    document
        .select(&selector(TRANSACTION_ROWS)?)
        .map(|row| -> Result<Transaction> {
            Ok(Transaction {
                description: description(row)?,
                amount: cents_within(row, ".trans-amount-cell")?,
                is_pending: has_class(row, PENDING_ROW),
                ending_balance: cents_within(row, ".trans-balance-cell")?,
            })
        })
        .collect()
}

/// The description is the text node right after the wrapper span inside the
/// cell's link, whitespace-normalized.
fn description(row: ElementRef<'_>) -> Result<Option<String>> {
    let Some(wrapper) = select_within(row, DESCRIPTION_WRAPPER)? else {
        return Ok(None);
    };
    Ok(wrapper
        .next_sibling()
        .and_then(|node| node.value().as_text().map(|text| normalize_whitespace(text))))
}

fn pending_balance(transactions: &[Transaction]) -> Option<i64> {
    transactions
        .first()
        .filter(|tx| tx.is_pending)
        .and_then(|tx| tx.ending_balance)
}

fn current_balance(document: &Html) -> Result<Option<i64>> {
    Ok(select_one(document, CURRENT_BALANCE)?
        .map(|elem| dollars_to_cents(element_text(elem).as_str()))
        .transpose()?)
}
