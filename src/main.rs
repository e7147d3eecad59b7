use anyhow::Result;
use clap::{Parser, Subcommand};
use mtrack::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional settings file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for mtrack::AppCommand {
    fn from(cmd: Commands) -> mtrack::AppCommand {
        match cmd {
            Commands::Run => mtrack::AppCommand::Run,
            Commands::Once => mtrack::AppCommand::Once,
            Commands::Show => mtrack::AppCommand::Show,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Poll prices every 30 minutes until stopped (default)
    Run,
    /// Run a single fetch, report and record cycle
    Once,
    /// Display the recorded ledger
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let command = cli.command.unwrap_or(Commands::Run);
    let result = mtrack::run_command(command.into(), cli.config_path.as_deref()).await;

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
