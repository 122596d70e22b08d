//! Depot gateway - extension-routing front end of the depot file store

use clap::Parser;
use depot_gateway::{run_server, GatewayConfig};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "depot-gateway")]
#[command(about = "Extension-routing front end of the depot distributed file store")]
#[command(version)]
struct Args {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "DEPOT_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "6201", env = "DEPOT_PORT")]
    port: u16,

    /// Root directory for local-class files
    #[arg(short, long, env = "DEPOT_ROOT")]
    root: PathBuf,

    /// Address of the pdf backend store
    #[arg(long, default_value = "127.0.0.1:6202", env = "DEPOT_PDF_STORE")]
    pdf_store: String,

    /// Address of the txt backend store
    #[arg(long, default_value = "127.0.0.1:6203", env = "DEPOT_TXT_STORE")]
    txt_store: String,

    /// Address of the zip backend store
    #[arg(long, default_value = "127.0.0.1:6204", env = "DEPOT_ZIP_STORE")]
    zip_store: String,

    /// Relocation attempts per uploaded file before giving up
    #[arg(long, default_value = "3", env = "DEPOT_RELOCATE_ATTEMPTS")]
    relocate_attempts: u32,

    /// Delay between relocation attempts, in milliseconds
    #[arg(long, default_value = "2000", env = "DEPOT_RELOCATE_RETRY_MS")]
    relocate_retry_ms: u64,

    /// Enable debug logging
    #[arg(short, long, env = "DEPOT_DEBUG")]
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
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("depot_gateway={log_level},depot_store={log_level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = GatewayConfig {
        host: args.host,
        port: args.port,
        root: args.root,
        relocate_attempts: args.relocate_attempts,
        relocate_retry_delay: Duration::from_millis(args.relocate_retry_ms),
        ..Default::default()
    };
    config.stores[0].addr = args.pdf_store;
    config.stores[1].addr = args.txt_store;
    config.stores[2].addr = args.zip_store;

    for store in &config.stores {
        tracing::info!("backend store [.{}] at {}", store.ext, store.addr);
    }

    run_server(config).await
}
