//! QuickCart CLI - Database migrations.
//!
//! # Usage
//!
//! ```bash
//! # Run order service database migrations
//! qc-cli migrate
//!
//! # Against an explicit database
//! qc-cli migrate --database-url postgres://localhost/quickcart
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run order service database migrations

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "qc-cli")]
#[command(author, version, about = "QuickCart CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run order service database migrations
    Migrate {
        /// Database URL (defaults to `ORDER_SERVICE_DATABASE_URL`, then `DATABASE_URL`)
        #[arg(long)]
        database_url: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate { database_url } => {
            commands::migrate::order_service(database_url).await?;
        }
    }
    Ok(())
}
