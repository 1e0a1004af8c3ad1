use anyhow::Context;
use clap::{Parser, Subcommand};
use sessionauth_lib::{
    config::{Settings, StorageKind, DEFAULT_CONFIG_PATH},
    create_router, storage, AppState,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "sessionauth-server", version, about = "Session authentication server")]
struct Cli {
    /// Configuration file; missing files fall back to defaults
    #[arg(short, long, env = "SESSIONAUTH_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Create the user database schema and exit
    Setup,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load_from(&cli.config)?;
    init_tracing(&settings);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(settings).await,
        Command::Setup => setup(settings).await,
    }
}

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log.level));
    let builder = fmt().with_env_filter(filter);
    if settings.log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn serve(settings: Settings) -> anyhow::Result<()> {
    let addr = settings.server.bind_addr()?;
    let sweep_interval = settings.session.sweep_interval_secs;
    if settings.storage.kind == StorageKind::Memory {
        warn!("in-memory user store: accounts are lost on restart");
    }

    let state = Arc::new(AppState::from_settings(settings).await?);
    let sweeper = (sweep_interval > 0).then(|| {
        state
            .sessions
            .spawn_sweeper(Duration::from_secs(sweep_interval))
    });

    let app = create_router(state);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    info!("server stopped");
    Ok(())
}

async fn setup(settings: Settings) -> anyhow::Result<()> {
    if settings.storage.kind != StorageKind::Sqlite {
        warn!("storage.kind is not sqlite; nothing to set up");
        return Ok(());
    }
    storage::connect(&settings.storage).await?;
    info!(url = %settings.storage.database_url, "user database ready");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
