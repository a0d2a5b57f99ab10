mod commands;

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rosterfeed_core::storage::http::HttpBackend;
use tracing_subscriber::EnvFilter;

/// rosterfeed — incremental roster browser with resilient photo resolution
#[derive(Parser)]
#[command(name = "rosterfeed", version, about)]
struct Cli {
    /// Backend base URL
    #[arg(long, env = "ROSTERFEED_URL")]
    url: String,

    /// Backend API key
    #[arg(long, env = "ROSTERFEED_KEY", hide_env_values = true)]
    key: String,

    /// Table holding the roster rows
    #[arg(long, default_value = "students")]
    table: String,

    /// Storage bucket holding the photos
    #[arg(long, default_value = "avatars")]
    bucket: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Page through the roster, loading more until told to stop
    List {
        /// Rows per page
        #[arg(long, default_value_t = rosterfeed_core::DEFAULT_PAGE_SIZE)]
        page_size: usize,

        /// Number of pages to load (0 = until exhausted)
        #[arg(long, default_value_t = 1)]
        pages: usize,
    },
    /// Resolve a single stored image path and report the outcome
    Resolve {
        /// Storage key, e.g. "p/123.jpg"
        path: String,

        /// Use the long detail-view signing TTL instead of the list TTL
        #[arg(long)]
        detail: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let backend = Arc::new(HttpBackend::new(&cli.url, &cli.key, &cli.table, &cli.bucket)?);

    match cli.command {
        Commands::List { page_size, pages } => commands::list::run(backend, page_size, pages).await,
        Commands::Resolve { path, detail } => commands::resolve::run(backend, &path, detail).await,
    }
}
