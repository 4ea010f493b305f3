use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bank_crawler::browser::ChromeSession;
use bank_crawler::clock::SystemClock;
use bank_crawler::config::{default_config_path, CrawlerConfig};
use bank_crawler::credentials::load_user;
use bank_crawler::models::Account;
use bank_crawler::{CrawlReport, Crawler};

#[derive(Parser)]
#[command(name = "bank-crawler")]
#[command(about = "Fetch account balances and transactions from a bank's online portal")]
struct Cli {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and fetch the configured accounts
    Crawl {
        /// Account to fetch, by its display name (repeatable; overrides config)
        #[arg(short, long = "account")]
        accounts: Vec<String>,

        /// Run the browser without a window
        #[arg(long)]
        headless: bool,

        /// Don't download images
        #[arg(long)]
        disable_images: bool,

        /// Chrome/Chromium executable
        #[arg(long)]
        chrome: Option<PathBuf>,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show current configuration
    Config,
}

#[derive(Serialize)]
struct CrawlOutput<'a> {
    crawled_at: chrono::DateTime<chrono::Utc>,
    report: &'a CrawlReport,
    accounts: &'a [Account],
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,chromiumoxide=warn,chromiumoxide::conn=off,chromiumoxide::handler=off")
    });
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.json())
            .init();
    } else {
        tracing_subscriber::registry().with(filter).with(layer).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config_path = cli.config.unwrap_or_else(default_config_path);
    let mut config = CrawlerConfig::load_or_default(&config_path)
        .with_context(|| format!("Failed to load config: {}", config_path.display()))?;

    match cli.command {
        Command::Config => {
            println!("Config file: {}", config_path.display());
            print!("{}", toml::to_string_pretty(&config)?);
        }
        Command::Crawl {
            accounts,
            headless,
            disable_images,
            chrome,
            output,
        } => {
            if !accounts.is_empty() {
                config.accounts = accounts;
            }
            config.browser.headless |= headless;
            config.browser.disable_images |= disable_images;
            if chrome.is_some() {
                config.browser.chrome_path = chrome;
            }
            crawl(&config, output).await?;
        }
    }

    Ok(())
}

async fn crawl(config: &CrawlerConfig, output: Option<PathBuf>) -> Result<()> {
    let wanted: HashSet<String> = config.wanted_accounts();
    if wanted.is_empty() {
        warn!("no accounts requested; only signing in");
    }

    let store = config
        .credentials
        .clone()
        .unwrap_or_default()
        .build();
    let mut user = load_user(store.as_ref())
        .await
        .context("Failed to load credentials")?;

    let session = ChromeSession::launch(&config.browser).await?;
    let crawler = Crawler::new(session, Arc::new(SystemClock), config.crawl_options());

    let result = crawler.start(&mut user, &wanted).await;
    if let Err(err) = crawler.end().await {
        warn!(error = %err, "failed to close browser");
    }
    let report = result?;

    if !report.signed_in {
        anyhow::bail!("Sign-in failed");
    }
    info!(
        fetched = report.fetched.len(),
        skipped = report.skipped.len(),
        "crawl finished"
    );

    let rendered = serde_json::to_string_pretty(&CrawlOutput {
        crawled_at: chrono::Utc::now(),
        report: &report,
        accounts: &user.accounts,
    })?;
    match output {
        Some(path) => std::fs::write(&path, rendered + "\n")
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{rendered}"),
    }

    Ok(())
}
