use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use rust_decimal::Decimal;
use twfx::cli::ui;
use twfx::core::RateError;
use twfx::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for twfx::AppCommand {
    fn from(cmd: Commands) -> twfx::AppCommand {
        match cmd {
            Commands::Rates => twfx::AppCommand::Rates,
            Commands::Refresh => twfx::AppCommand::Refresh,
            Commands::To { amount, currency } => twfx::AppCommand::To { amount, currency },
            Commands::From { amount, currency } => twfx::AppCommand::From { amount, currency },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display the current exchange rates
    Rates,
    /// Fetch the latest exchange rates from Bank of Taiwan
    Refresh,
    /// Convert a TWD amount to a foreign currency
    #[command(allow_negative_numbers = true)]
    To {
        /// Amount in TWD
        amount: Decimal,
        /// Target currency code, e.g. USD
        currency: String,
    },
    /// Convert a foreign currency amount to TWD
    #[command(allow_negative_numbers = true)]
    From {
        /// Amount in the foreign currency
        amount: Decimal,
        /// Source currency code, e.g. JPY
        currency: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => twfx::cli::setup::setup(),
        Some(cmd) => twfx::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
        if let Some(rate_error) = e.downcast_ref::<RateError>() {
            eprintln!(
                "{}",
                ui::style_text(&rate_error.user_message(), ui::StyleType::Error)
            );
            std::process::exit(1);
        }
    }
    result
}
