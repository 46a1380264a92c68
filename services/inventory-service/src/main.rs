//! Bionexa Inventory Service
//!
//! HTTP surface for the lab chemical inventory: receiving and dispatching
//! lots, the staff dashboard, barcode labels and the client report portal.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, Method},
    routing::get,
    serve, Router,
};
use chrono::Local;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use bionexa_database::{initialize_database, DatabaseConfig};
use bionexa_utils::{init_logging, AppConfig};

mod barcode;
mod export;
mod handlers;
mod labels;
mod middleware;
mod routes;
mod seed;
mod service;


use middleware::{request_id_middleware, REQUEST_ID_HEADER};
use service::InventoryService;

#[derive(Parser)]
#[command(name = "bionexa-inventory-service")]
#[command(about = "Lab chemical inventory with barcode receipt and dispatch")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP service (default)
    Serve,

    /// Load demo data into the configured database
    Seed {
        /// Number of catalogue lots to receive
        #[arg(long, default_value_t = seed::DEFAULT_SEED_COUNT)]
        count: usize,

        /// Also register the client portal demo samples
        #[arg(long)]
        client_portal: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration ({}), using defaults", e);
        AppConfig::default()
    });

    init_logging(&config.logging)?;

    for dir in [&config.storage.barcode_dir, &config.storage.report_dir] {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("creating storage directory {}", dir))?;
    }

    let db_config = DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        connection_timeout: Duration::from_secs(config.database.connection_timeout_seconds),
    };
    let pool = initialize_database(&db_config).await?;
    info!(url = %db_config.url, "Database ready");

    let service = InventoryService::from_config(pool, &config);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => run_server(service, &config).await,
        Command::Seed { count, client_portal } => {
            let today = Local::now().date_naive();
            let report = seed::seed_inventory(&service, count, today).await?;
            println!("Inventory: {} received, {} already present", report.received, report.skipped);
            if client_portal {
                let report = seed::seed_client_portal(&service, today).await?;
                println!("Client portal: {} received, {} already present", report.received, report.skipped);
            }
            Ok(())
        }
    }
}

async fn run_server(service: InventoryService, config: &AppConfig) -> Result<()> {
    info!("Starting Bionexa Inventory Service");
    let app = create_app(service, config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid server address")?;
    let listener = TcpListener::bind(&addr).await?;
    info!("Inventory service listening on {}", addr);

    serve(listener, app).await?;

    Ok(())
}

pub fn create_app(service: InventoryService, config: &AppConfig) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::create_api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods([Method::GET, Method::POST, Method::PUT])
                        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(REQUEST_ID_HEADER)]),
                )
                .layer(DefaultBodyLimit::max(config.server.max_request_size))
                .layer(axum::middleware::from_fn(request_id_middleware)),
        )
        .with_state(AppState { service })
}

#[derive(Clone)]
pub struct AppState {
    pub service: InventoryService,
}
