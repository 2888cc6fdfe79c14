use anyhow::Result;
use clap::Parser;
use forge_rate_limit::FixedWindowLimiter;
use forge_server::{ForgeConfig, build_state, init_tracing, migrate, router};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Lesson Forge generation server", long_about = None)]
struct Args {
    /// Configuration file layered over the bundled defaults
    #[arg(short, long, env = "FORGE_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, overriding server.bind and PORT
    #[arg(short, long)]
    bind: Option<String>,

    /// Apply database migrations and exit
    #[arg(long)]
    migrate: bool,

    /// Emit logs as JSON lines
    #[arg(long, env = "FORGE_JSON_LOGS")]
    json_logs: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing(&args.log_level, args.json_logs)?;

    let mut config = ForgeConfig::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config = config.with_bind(bind);
    }

    if args.migrate {
        tokio::task::spawn_blocking(move || migrate(&config)).await??;
        info!("Migrations applied");
        return Ok(());
    }

    let limiter = Arc::new(FixedWindowLimiter::new(config.rate_limit().clone())?);
    let _sweeper = limiter.spawn_sweeper(config.rate_limit().sweep_interval());

    let state = {
        let config = config.clone();
        let limiter = limiter.clone();
        tokio::task::spawn_blocking(move || build_state(&config, limiter)).await??
    };
    let app = router(state, config.server().cors_origins());

    let listener = tokio::net::TcpListener::bind(config.server().bind()).await?;
    info!(
        address = %listener.local_addr()?,
        mock = *config.providers().mock(),
        "Lesson Forge listening"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
