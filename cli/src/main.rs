//! Mercura CLI - Terminal front-end for the inventory ledger

use clap::{Parser, Subcommand};
use mercura_core::{LedgerConfig, MerchandiseId};
use mercura_ledger::InventoryLedger;
use mercura_persist::SledDurableStore;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod commands;

#[derive(Parser)]
#[command(name = "mercura")]
#[command(about = "Mercura - inventory and point-of-sale ledger")]
#[command(version)]
struct Cli {
    /// Data directory holding the durable snapshot store
    #[arg(short, long, default_value = "./data")]
    data_dir: PathBuf,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register new merchandise
    Register {
        /// Merchandise name
        name: String,

        /// Free-text description
        #[arg(short = 'D', long, default_value = "")]
        description: String,

        /// Unit price, greater than 0
        #[arg(short, long)]
        price: f64,

        /// Starting quantity on hand
        #[arg(short, long)]
        quantity: i64,
    },

    /// Sell merchandise by id
    Sell {
        /// Merchandise id
        id: u64,

        /// Quantity to sell
        quantity: i64,
    },

    /// List all merchandise, newest registration first
    List,

    /// List merchandise with stock on hand, alphabetical
    Sellable,

    /// Show the sales history, newest first
    History,

    /// Show sale count and total revenue
    Summary,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level: Level = cli.log_level.parse().unwrap_or(Level::WARN);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let store = SledDurableStore::open(&cli.data_dir)?;
    let ledger = InventoryLedger::open(store, LedgerConfig::default()).await?;

    match cli.command {
        Commands::Register {
            name,
            description,
            price,
            quantity,
        } => commands::register(&ledger, &name, &description, price, quantity, cli.json).await,
        Commands::Sell { id, quantity } => {
            commands::sell(&ledger, MerchandiseId::new(id), quantity, cli.json).await
        }
        Commands::List => commands::list(&ledger, cli.json),
        Commands::Sellable => commands::sellable(&ledger, cli.json),
        Commands::History => commands::history(&ledger, cli.json),
        Commands::Summary => commands::summary(&ledger, cli.json),
    }
}
