use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxwatch::dataset::{SortDirection, SortKey};
use fxwatch::log::init_logging;
use std::path::PathBuf;

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

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display the market price table
    Prices {
        /// Case-insensitive substring match on symbol or name
        #[arg(short, long)]
        search: Option<String>,
        /// Sort key: symbol, name, price or market-cap
        #[arg(long, value_parser = clap::value_parser!(SortKey))]
        sort: Option<SortKey>,
        /// Sort descending instead of ascending
        #[arg(long)]
        desc: bool,
        /// Display currency (converts the USD-priced table)
        #[arg(long)]
        currency: Option<String>,
    },
    /// Convert an amount to one or more currencies
    Convert {
        amount: f64,
        from: String,
        /// Target currencies
        #[arg(required = true)]
        to: Vec<String>,
        /// Export this run's conversions as CSV
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// List exchange rates against a base currency
    Rates {
        /// Case-insensitive substring match on code or currency name
        #[arg(short, long)]
        search: Option<String>,
        /// Base currency (defaults to the configured one)
        #[arg(short, long)]
        base: Option<String>,
    },
}

impl From<Commands> for fxwatch::AppCommand {
    fn from(cmd: Commands) -> fxwatch::AppCommand {
        match cmd {
            Commands::Prices {
                search,
                sort,
                desc,
                currency,
            } => fxwatch::AppCommand::Prices(fxwatch::prices::PricesQuery {
                search,
                sort,
                direction: if desc {
                    SortDirection::Descending
                } else {
                    SortDirection::Ascending
                },
                currency,
            }),
            Commands::Convert {
                amount,
                from,
                to,
                export,
            } => fxwatch::AppCommand::Convert(fxwatch::exchange::ConvertRequest {
                amount,
                from,
                targets: to,
                export,
            }),
            Commands::Rates { search, base } => fxwatch::AppCommand::Rates { base, search },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => fxwatch::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

fn setup() -> anyhow::Result<()> {
    use anyhow::Context;

    let path = fxwatch::config::AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let default_config = r#"---
currency: "USD"

providers:
  market:
    base_url: "https://api.coingecko.com"
  rates:
    base_url: "https://api.exchangerate-api.com"
"#;

    std::fs::write(&path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
