//! Crawl a bank's online portal for account balances and transactions.
//!
//! A [`crawler::Crawler`] drives a browser [`session::Session`] through
//! sign-in, reads the account list from the landing page, then opens each
//! requested account and extracts its balance and transactions.

#[cfg(feature = "browser")]
pub mod browser;
pub mod clock;
pub mod config;
pub mod crawler;
pub mod credentials;
pub mod duration;
pub mod error;
pub mod models;
pub mod navigate;
pub mod normalize;
pub mod parser;
pub mod session;
pub mod signin;
pub mod wait;

pub use crawler::{CrawlOptions, CrawlReport, Crawler};
pub use error::{CrawlError, FormatError, Result, SessionError};
