//! Aegis dashboard entry point
//!
//! # Usage
//!
//! ```bash
//! # Start the API server
//! aegis serve --config aegis.yaml --port 8080
//!
//! # Evaluate stored vendors once and print JSON
//! aegis vendor-status --storage sled --data-dir ./data/aegis
//!
//! # Install the default vendors and bridges
//! aegis seed --storage sled
//! ```

use aegis_api::{create_router, AppState, Settings, StorageKind};
use aegis_core::{CollaborationBridge, Vendor};
use aegis_integrations::{IntegrationGateway, VendorStatusEvaluator};
use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "aegis")]
#[command(about = "Aegis operations dashboard backend")]
#[command(version)]
struct Cli {
    /// Settings file (JSON, YAML or TOML)
    #[arg(short, long, global = true, env = "AEGIS_CONFIG")]
    config: Option<PathBuf>,

    #[command(flatten)]
    storage: StorageArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct StorageArgs {
    /// Storage backend
    #[arg(long, global = true, value_enum, env = "AEGIS_STORAGE")]
    storage: Option<StorageKind>,

    /// Data directory for the sled backend
    #[arg(long, global = true, env = "AEGIS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Credentials file in .env format
    #[arg(long, global = true, env = "AEGIS_CREDENTIALS_FILE")]
    credentials_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long, env = "AEGIS_HOST")]
        host: Option<String>,
    },

    /// Evaluate every stored vendor once and print the statuses as JSON
    VendorStatus,

    /// Install the default vendors and collaboration bridges if absent
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let cli = Cli::parse();
    let mut settings = match &cli.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };
    if let Some(kind) = cli.storage.storage {
        settings.storage.backend = kind;
    }
    if let Some(dir) = cli.storage.data_dir {
        settings.storage.path = dir;
    }
    if let Some(file) = cli.storage.credentials_file {
        settings.credentials.dotenv = Some(file);
    }

    match cli.command {
        Commands::Serve { port, host } => {
            if let Some(port) = port {
                settings.server.port = port;
            }
            if let Some(host) = host {
                settings.server.host = host;
            }
            let addr: SocketAddr =
                format!("{}:{}", settings.server.host, settings.server.port).parse()?;

            let state = Arc::new(build_state(&settings)?);
            let router = create_router(state);

            tracing::info!(
                %addr,
                storage = ?settings.storage.backend,
                version = env!("CARGO_PKG_VERSION"),
                "Starting Aegis dashboard API"
            );
            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, router).await?;
        }

        Commands::VendorStatus => {
            let state = build_state(&settings)?;
            state.store.ensure_seed::<Vendor>().await?;
            let vendors = state.store.list::<Vendor>().await?;
            let statuses = state.vendors.statuses(&vendors).await;
            println!("{}", serde_json::to_string_pretty(&statuses)?);
        }

        Commands::Seed => {
            let store = settings.storage.open_store()?;
            let vendors = store.ensure_seed::<Vendor>().await?;
            let bridges = store.ensure_seed::<CollaborationBridge>().await?;
            println!(
                "{}",
                serde_json::json!({ "vendors": vendors, "collaborationBridges": bridges })
            );
        }
    }

    Ok(())
}

fn build_state(settings: &Settings) -> anyhow::Result<AppState> {
    let store = settings.storage.open_store()?;
    let credentials = Arc::new(settings.credentials.credential_chain()?);
    let http = settings.http.to_http_settings();
    let gateway = IntegrationGateway::from_settings(&http, credentials)?;
    let vendors = VendorStatusEvaluator::from_settings(&http)?;
    Ok(AppState::new(store, gateway, vendors))
}
