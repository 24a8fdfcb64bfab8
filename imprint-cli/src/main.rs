//! Imprint CLI - offline administration of the publisher directory

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "imprint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Data directory shared with the server
    #[arg(
        long,
        global = true,
        env = "IMPRINT_DATA_PATH",
        default_value = "./imprint_data"
    )]
    data: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load or wipe sample data
    Seed {
        #[command(subcommand)]
        action: SeedAction,
    },

    /// Run a list query against a collection and print the result page
    Query {
        /// Collection name (publishers, books, reviews, users)
        collection: String,

        /// Query string, e.g. "price[lte]=20&sort=-price&page=2"
        #[arg(default_value = "")]
        query: String,
    },

    /// Create an admin account
    CreateAdmin {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },
}

#[derive(Subcommand)]
enum SeedAction {
    /// Import users.json, publishers.json, books.json and reviews.json from a directory
    Import {
        /// Directory holding the JSON files
        dir: PathBuf,
    },

    /// Delete every document in every collection
    Destroy,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "imprint_cli=debug,imprint_core=debug"
    } else {
        "imprint_cli=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Seed {
            action: SeedAction::Import { dir },
        } => commands::seed_import(&cli.data, &dir).await,

        Commands::Seed {
            action: SeedAction::Destroy,
        } => commands::seed_destroy(&cli.data).await,

        Commands::Query { collection, query } => {
            commands::query(&cli.data, &collection, &query).await
        }

        Commands::CreateAdmin {
            name,
            email,
            password,
        } => commands::create_admin(&cli.data, name, email, password).await,
    }
}
