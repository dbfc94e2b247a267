//! UpFlow - Up Bank transactions, synced locally and served over HTTP

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod api;
mod commands;
mod output;

use commands::{serve, status, sync, transactions};

/// UpFlow - incremental Up Bank sync with a paged transactions API
#[derive(Parser)]
#[command(name = "upflow", version, about, long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve,

    /// Pull new settled transactions from Up Bank
    Sync {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List stored transactions
    Transactions {
        /// Rows to skip
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        skip: i64,
        /// Rows to return
        #[arg(long, default_value_t = 20, allow_negative_numbers = true)]
        take: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show what is stored and whether Up Bank is reachable
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "upflow=debug,upflow_core=debug"
    } else {
        "upflow=info,upflow_core=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve => serve::run(),
        Commands::Sync { json } => sync::run(json),
        Commands::Transactions { skip, take, json } => transactions::run(skip, take, json),
        Commands::Status { json } => status::run(json),
    }
}
