//! Depot backend store - extension-scoped file store service

use clap::Parser;
use depot_store::{run_server, StoreConfig};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "depot-store")]
#[command(about = "Extension-scoped backend store for the depot gateway")]
#[command(version)]
struct Args {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "DEPOT_STORE_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "6202", env = "DEPOT_STORE_PORT")]
    port: u16,

    /// Root directory holding this store's files
    #[arg(short, long, env = "DEPOT_STORE_ROOT")]
    root: PathBuf,

    /// Extension class this store serves (with or without the dot)
    #[arg(short, long, env = "DEPOT_STORE_EXT")]
    ext: String,

    /// Enable debug logging
    #[arg(short, long, env = "DEPOT_STORE_DEBUG")]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Setup logging
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("depot_store={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = StoreConfig {
        host: args.host,
        port: args.port,
        root: args.root,
        ext: args.ext.trim_start_matches('.').to_ascii_lowercase(),
    };

    run_server(config).await
}
