mod account;
mod transaction;
mod user;

pub use account::{Account, AccountType};
pub use transaction::Transaction;
pub use user::User;
