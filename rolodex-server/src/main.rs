//! # Rolodex Server
//!
//! Account service exposing a role-gated user resource over HTTP.
//!
//! Without a subcommand the binary serves. `db migrate` applies the embedded
//! migrations and `bootstrap-admin` provisions the first administrator.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use rolodex_config::{Config, ConfigLoad, ConfigLoader};
use rolodex_core::{
    application::bootstrap::bootstrap_admin, auth::CredentialSealer,
    database::DatabaseContext,
};
use rolodex_server::{
    AppState, create_app,
    infra::telemetry::{TelemetryGuard, init_tracing},
};
use tracing::{info, warn};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "rolodex-server")]
#[command(about = "Account service with a role-gated user resource")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true, env = "ROLODEX_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Server port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long)]
    host: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(subcommand)]
    Db(DbCommand),
    /// Create an administrator directly in the store and print its handle
    BootstrapAdmin(BootstrapArgs),
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Apply database migrations and exit
    Migrate,
}

#[derive(ClapArgs, Debug)]
struct BootstrapArgs {
    #[arg(long)]
    email: String,

    #[arg(long, env = "ROLODEX_ADMIN_PASSWORD")]
    password: String,

    /// Create another administrator even if one exists
    #[arg(long, default_value_t = false)]
    force: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (config, _telemetry) = load_runtime_config(&cli)?;

    match cli.command {
        Some(Command::Db(DbCommand::Migrate)) => run_db_migrate(&config).await,
        Some(Command::BootstrapAdmin(args)) => {
            run_bootstrap_admin(&config, args).await
        }
        None => run_server(config).await,
    }
}

fn load_runtime_config(
    cli: &Cli,
) -> anyhow::Result<(Arc<Config>, TelemetryGuard)> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_config_path(path);
    }
    let ConfigLoad {
        mut config,
        warnings,
    } = loader.load().context("failed to load configuration")?;

    if let Some(port) = cli.serve.port {
        config.server.port = port;
    }
    if let Some(host) = cli.serve.host.clone() {
        config.server.host = host;
    }

    let telemetry = init_tracing(config.profile, &config.log)?;

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = &config.metadata.config_path {
        info!(path = %path.display(), "configuration file loaded");
    }
    for warning in warnings.iter() {
        match &warning.hint {
            Some(hint) => {
                warn!(message = %warning.message, hint = %hint, "configuration warning")
            }
            None => {
                warn!(message = %warning.message, "configuration warning")
            }
        }
    }
    info!(profile = %config.profile, "configuration in effect");

    Ok((Arc::new(config), telemetry))
}

async fn open_database(config: &Config) -> anyhow::Result<DatabaseContext> {
    let database = DatabaseContext::connect(config.database.url.as_deref())
        .await
        .context("failed to open the identity store")?;
    database
        .migrate()
        .await
        .context("database migration failed")?;
    Ok(database)
}

fn build_sealer(config: &Config) -> anyhow::Result<CredentialSealer> {
    CredentialSealer::new(
        config.auth.password_pepper.as_bytes(),
        config.auth.token_key.as_bytes(),
    )
    .context("failed to initialize credential sealing")
}

async fn run_db_migrate(config: &Config) -> anyhow::Result<()> {
    let database = open_database(config).await?;
    if database.pool().is_some() {
        info!("Database migrations applied successfully");
    }
    Ok(())
}

async fn run_bootstrap_admin(
    config: &Config,
    args: BootstrapArgs,
) -> anyhow::Result<()> {
    let database = open_database(config).await?;
    if database.pool().is_none() {
        warn!("No database URL configured; the administrator will not persist");
    }
    let sealer = build_sealer(config)?;

    let admin = bootstrap_admin(
        database.unit_of_work().identities.as_ref(),
        &sealer,
        &args.email,
        &args.password,
        args.force,
    )
    .await
    .context("failed to bootstrap administrator")?;

    println!("{}", admin.username);
    Ok(())
}

async fn run_server(config: Arc<Config>) -> anyhow::Result<()> {
    let database = open_database(&config).await?;
    info!(backend = %database.backend(), "Identity store ready");

    let sealer = Arc::new(build_sealer(&config)?);
    let state = AppState::new(
        Arc::clone(&config),
        database.unit_of_work(),
        sealer,
    )
    .context("failed to build application state")?;
    let router = create_app(state);

    let address = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!("Starting Rolodex Server (HTTP) on {}", address);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
