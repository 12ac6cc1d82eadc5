//! Roster kernel server.
//!
//! `roster serve` (the default) runs the HTTP API, `roster migrate` applies
//! database migrations, and `roster seed <file>` imports providers.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method};
use clap::{Parser, Subcommand};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use roster_kernel::config::{Config, StoreKind};
use roster_kernel::search::{PgProviderStore, ProviderStore, load_seed_file};
use roster_kernel::state::AppState;
use roster_kernel::{db, routes};

#[derive(Debug, Parser)]
#[command(name = "roster", version, about = "Provider directory search service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server.
    Serve,
    /// Apply database migrations and exit.
    Migrate,
    /// Import providers from a JSON array into PostgreSQL.
    Seed {
        /// Path to the seed file.
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env().context("failed to load configuration")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Migrate => migrate(config).await,
        Command::Seed { path } => seed(config, path).await,
    }
}

async fn serve(config: Config) -> Result<()> {
    info!(port = config.port, store = ?config.store, "Starting Roster kernel");

    let state = AppState::new(&config)
        .await
        .context("failed to initialize application state")?;

    info!(
        cities = state.catalog().cities().len(),
        "Location catalog loaded"
    );

    let cors = build_cors_layer(&config);

    let app = routes::app(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind to address")?;

    info!(%addr, "Server listening");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

async fn migrate(config: Config) -> Result<()> {
    let pool = db::create_pool(&config)
        .await
        .context("failed to create database pool")?;
    db::run_migrations(&pool).await
}

async fn seed(config: Config, path: PathBuf) -> Result<()> {
    if config.store == StoreKind::Memory {
        warn!("STORE=memory: use SEED_FILE instead; nothing imported");
        return Ok(());
    }

    let pool = db::create_pool(&config)
        .await
        .context("failed to create database pool")?;
    db::run_migrations(&pool).await?;

    let store = PgProviderStore::new(pool, config.search.statement_timeout_secs);
    let providers = load_seed_file(&path)?;
    let count = providers.len();
    for provider in providers {
        store.insert(provider).await?;
    }
    info!(count, "providers imported");
    Ok(())
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];

    if config.cors_allowed_origins.len() == 1 && config.cors_allowed_origins[0] == "*" {
        CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(methods)
            .allow_headers(tower_http::cors::Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_allowed_origins
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(origin = %o, "ignoring unparseable CORS origin");
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(tower_http::cors::Any)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
