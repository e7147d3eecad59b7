pub mod cli;
pub mod core;
pub mod fetcher;
pub mod ledger;
pub mod notify;
pub mod providers;
pub mod tracker;

use crate::core::TokioSleeper;
use crate::core::config::AppConfig;
use crate::fetcher::PriceFetcher;
use crate::ledger::CsvLedger;
use crate::notify::SmtpNotifier;
use crate::tracker::Tracker;
use anyhow::Result;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    Run,
    Once,
    Show,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = AppConfig::load(config_path.map(Path::new))?;
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Run => {
            info!("Market tracker starting...");
            build_tracker(&config)?.run(None).await
        }
        AppCommand::Once => build_tracker(&config)?.run_cycle().await.map(|_| ()),
        AppCommand::Show => show_ledger(&config),
    }
}

fn build_tracker(config: &AppConfig) -> Result<Tracker<SmtpNotifier, TokioSleeper>> {
    Ok(Tracker::new(
        PriceFetcher::from_config(config)?,
        SmtpNotifier::new(config)?,
        CsvLedger::new(&config.ledger_path, &config.local_currency),
        TokioSleeper,
        &config.local_currency,
    ))
}

fn show_ledger(config: &AppConfig) -> Result<()> {
    let ledger = CsvLedger::new(&config.ledger_path, &config.local_currency);
    let rows = ledger.rows()?;
    if rows.is_empty() {
        println!(
            "{}",
            cli::ui::style_text(
                &format!("No data recorded in {}", ledger.path().display()),
                cli::ui::StyleType::Subtle
            )
        );
        return Ok(());
    }
    println!("{}", cli::ui::ledger_table(ledger.header(), &rows));
    Ok(())
}
