//! Racquet club tournament server.
//!
//! Loads configuration, connects PostgreSQL (or an in-memory store for
//! local runs), applies migrations and serves the HTTP API.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Error};
use pico_args::Arguments;
use racquet_club::{
    ClubServices,
    db::{Database, MemoryStore, Store, StoreHealth},
};
use rc_server::{
    api::{self, AppState},
    config::ServerConfig,
    logging,
};
use tracing::info;

const HELP: &str = "\
Run the racquet club tournament server

USAGE:
  rc_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8080]
  --db-url     URL         Database connection string  [default: env DATABASE_URL]

FLAGS:
  --in-memory              Keep all data in process memory instead of PostgreSQL
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  DATABASE_URL             PostgreSQL connection string
  JWT_SECRET               JWT signing secret (required, >= 32 chars)
  PASSWORD_PEPPER          Password hashing pepper (required, >= 16 chars)
  TOKEN_TTL_HOURS          Access token lifetime [default: 24]
  CORS_ORIGIN              Allowed browser origin [default: http://localhost:3000]
  BOOTSTRAP_ADMIN_*        USERNAME, EMAIL and PASSWORD of an admin created at startup
  (See .env file for all configuration options)
";

struct Args {
    bind: Option<SocketAddr>,
    database_url: Option<String>,
    in_memory: bool,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        bind: pargs.opt_value_from_str("--bind")?,
        database_url: pargs.opt_value_from_str("--db-url")?,
        in_memory: pargs.contains("--in-memory"),
    };

    logging::init();

    let config = ServerConfig::from_env(args.bind, args.database_url)?;
    config.validate()?;

    info!("Starting racquet club server at {}", config.bind);

    let state = if args.in_memory {
        info!("Using in-memory store; data is lost on exit");
        build_state(Arc::new(MemoryStore::new()), &config)
    } else {
        info!("Connecting to database");
        let db = Database::new(&config.database)
            .await
            .context("Failed to connect to database")?;
        db.migrate().await.context("Failed to run migrations")?;
        info!("Database connected and migrated");
        build_state(Arc::new(db.store()), &config)
    };

    if let Some(admin) = &config.bootstrap_admin {
        let user = state
            .services
            .auth
            .ensure_admin(&admin.username, &admin.email, &admin.password)
            .await
            .context("Failed to bootstrap admin account")?;
        info!("Admin account ready: {} (ID: {})", user.username, user.id);
    }

    let cors = api::cors_layer(&config.cors_origin).context("Invalid CORS_ORIGIN")?;
    let app = api::create_router(state, cors);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down server...");

    Ok(())
}

fn build_state<S: Store + 'static>(store: Arc<S>, config: &ServerConfig) -> AppState {
    let mut services = ClubServices::new(
        store.clone(),
        config.security.password_pepper.clone(),
        config.security.jwt_secret.clone(),
    );
    services.auth = services
        .auth
        .with_token_ttl(chrono::Duration::hours(config.security.token_ttl_hours));

    let store: Arc<dyn StoreHealth> = store;
    AppState { services, store }
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install CTRL+C signal handler: {}", e);
        std::future::pending::<()>().await;
    }
}
