use scraper::Html;

use super::{
    cents_within, element_text, has_class, select_one, select_within, selector, AccountDetail,
};
use crate::error::Result;
use crate::models::Transaction;
use crate::normalize::{dollars_to_cents, normalize_whitespace};

const BALANCE: &str = ".ad-acct-summary-module-deposit-skin .TL_NPI_Amt";
const TRANSACTION_BODY: &str = "table.transaction-records > tbody";
const TRANSACTION_ROWS: &str = "tr.record, tr.in-transit-record";
const IN_TRANSIT: &str = "in-transit-record";

/// Parse a checking/savings detail page.
pub fn parse_deposit(markup: &str) -> Result<AccountDetail> {
    let document = Html::parse_document(markup);

    let balance = select_one(&document, BALANCE)?
        .map(|elem| dollars_to_cents(element_text(elem).as_str()))
        .transpose()?;

    Ok(AccountDetail {
        balance,
        transactions: transactions(&document)?,
    })
}

fn transactions(document: &Html) -> Result<Vec<Transaction>> {
    let Some(body) = select_one(document, TRANSACTION_BODY)? else {
        return Ok(Vec::new());
    };

    body.select(&selector(TRANSACTION_ROWS)?)
        .map(|row| -> Result<Transaction> {
            Ok(Transaction {
                description: select_within(row, "td.description")?
                    .map(|cell| normalize_whitespace(&element_text(cell))),
                amount: cents_within(row, "td.amount")?,
                is_pending: has_class(row, IN_TRANSIT),
                ending_balance: cents_within(row, "td.balance")?,
            })
        })
        .collect()
}
