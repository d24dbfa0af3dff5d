//! herb-api: REST API for the HerbTrace supply chain ledger
//!
//! Serves herb batch CRUD, supply chain timelines and statistics over HTTP,
//! backed either by the network CLI or by an in-process ledger.

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use herb_api::config::{Config, LedgerBackend};
use herb_api::ledger::build_client;
use herb_api::{create_router, AppState};

#[derive(Parser)]
#[command(name = "herb-api")]
#[command(about = "REST API for the HerbTrace supply chain ledger")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "herb-api.toml", env = "HERB_API_CONFIG")]
    config: String,

    /// HTTP port (overrides config file)
    #[arg(short, long, env = "HERB_API_PORT")]
    port: Option<u16>,

    /// Ledger backend (overrides config file)
    #[arg(long, value_enum, env = "HERB_API_LEDGER_BACKEND")]
    ledger_backend: Option<LedgerBackend>,

    /// Network directory for CLI invocations (overrides config file)
    #[arg(long, env = "HERB_API_NETWORK_PATH")]
    network_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("herb_api=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    info!("Starting herb-api");
    info!("Config file: {}", cli.config);

    // Load or create default config
    let mut config = if std::path::Path::new(&cli.config).exists() {
        let content = std::fs::read_to_string(&cli.config)?;
        Config::from_toml_str(&content)?
    } else {
        info!("Config file not found, using defaults");
        Config::default()
    };

    // Apply CLI overrides
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(backend) = cli.ledger_backend {
        config.ledger.backend = backend;
    }
    if let Some(network_path) = cli.network_path {
        config.ledger.network_path = network_path;
    }

    let ledger = build_client(&config.ledger)?;
    info!("Ledger backend: {}", ledger.backend_name());
    if config.ledger.backend == LedgerBackend::Cli {
        info!("Network path: {}", config.ledger.network_path.display());
        info!(
            "Chaincode: {} on channel {}",
            config.ledger.chaincode_name, config.ledger.channel_name
        );
    }

    let app = create_router(AppState::new(ledger));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("HerbTrace API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
