//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};

/// Storage backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

/// Search tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSettings {
    /// Result cache TTL; zero disables the cache.
    pub cache_ttl: Duration,

    /// Hard cap on the page size (default: 100).
    pub max_limit: u64,

    /// Per-search statement timeout in seconds (default: 10).
    pub statement_timeout_secs: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(30),
            max_limit: 100,
            statement_timeout_secs: 10,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// PostgreSQL connection URL. Required for the Postgres store.
    pub database_url: Option<String>,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    pub store: StoreKind,

    /// City/district catalog (default: ./locations.toml).
    pub locations_file: PathBuf,

    /// Provider JSON loaded into the memory store at startup.
    pub seed_file: Option<PathBuf>,

    /// CORS allowed origins (comma-separated, default: "*").
    pub cors_allowed_origins: Vec<String>,

    pub search: SearchSettings,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = var("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let store = match var("STORE")
            .unwrap_or_else(|| "postgres".to_string())
            .to_lowercase()
            .as_str()
        {
            "postgres" => StoreKind::Postgres,
            "memory" => StoreKind::Memory,
            other => bail!("STORE must be 'postgres' or 'memory', got '{other}'"),
        };

        let database_url = var("DATABASE_URL");
        if store == StoreKind::Postgres && database_url.is_none() {
            bail!("DATABASE_URL environment variable is required when STORE=postgres");
        }

        let database_max_connections = var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let locations_file = var("LOCATIONS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./locations.toml"));

        let seed_file = var("SEED_FILE").map(PathBuf::from);

        let cors_allowed_origins = var("CORS_ALLOWED_ORIGINS")
            .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_else(|| vec!["*".to_string()]);

        let cache_ttl_secs: u64 = var("SEARCH_CACHE_TTL_SECS")
            .unwrap_or_else(|| "30".to_string())
            .parse()
            .context("SEARCH_CACHE_TTL_SECS must be a valid u64")?;

        let max_limit: u64 = var("SEARCH_MAX_LIMIT")
            .unwrap_or_else(|| "100".to_string())
            .parse()
            .context("SEARCH_MAX_LIMIT must be a valid u64")?;
        if max_limit == 0 {
            bail!("SEARCH_MAX_LIMIT must be at least 1");
        }

        let statement_timeout_secs = var("SEARCH_STATEMENT_TIMEOUT_SECS")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .context("SEARCH_STATEMENT_TIMEOUT_SECS must be a valid u64")?;

        Ok(Self {
            port,
            database_url,
            database_max_connections,
            store,
            locations_file,
            seed_file,
            cors_allowed_origins,
            search: SearchSettings {
                cache_ttl: Duration::from_secs(cache_ttl_secs),
                max_limit,
                statement_timeout_secs,
            },
        })
    }
}
